//! GPIO signal output
//!
//! Drives a door operator or sensor signal through a GPIO pin. Each signal
//! has its own electrical active level: the closing-edge outputs are active
//! low, the relay outputs active high.

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;
use janus_core::traits::SignalOutput;

/// Electrical level that asserts the signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveLevel {
    High,
    Low,
}

/// Signal output on a GPIO pin
pub struct GpioSignal<P> {
    pin: P,
    level: ActiveLevel,
    /// Current logical state (true = asserted)
    active: bool,
}

impl<P: OutputPin<Error = Infallible>> GpioSignal<P> {
    /// Create a new signal output, initially released
    pub fn new(pin: P, level: ActiveLevel) -> Self {
        let mut signal = Self {
            pin,
            level,
            active: false,
        };
        signal.write(false);
        signal
    }

    /// Create a new signal output that is asserted when the pin is high
    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, ActiveLevel::High)
    }

    /// Create a new signal output that is asserted when the pin is low
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, ActiveLevel::Low)
    }

    fn write(&mut self, active: bool) {
        let high = active == (self.level == ActiveLevel::High);
        let result = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.unwrap_or_else(|never| match never {});
    }
}

impl<P: OutputPin<Error = Infallible>> SignalOutput for GpioSignal<P> {
    fn set_active(&mut self, active: bool) {
        if active != self.active {
            self.active = active;
            self.write(active);
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
