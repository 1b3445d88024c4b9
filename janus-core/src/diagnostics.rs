//! Diagnostic port image
//!
//! Two 16-bit port expanders drive LEDs that show every input and output
//! of the controller. The image is four plain bytes rebuilt each cycle and
//! only changed bytes go out on the bus.

#[cfg(feature = "defmt")]
use defmt::Format;

use crate::config::OperatingMode;
use crate::sensors::{DoorPosition, PresenceSnapshot};
use crate::traits::{ExpanderPort, PortExpander};

/// Expander 1, port A: door and mode
pub mod ext1_a {
    pub const SWITCH_OUTSIDE: u8 = 1 << 0;
    pub const SWITCH_INSIDE: u8 = 1 << 1;
    pub const DOOR_OPEN: u8 = 1 << 2;
    pub const DOOR_CLOSED: u8 = 1 << 3;
    pub const MODE_AUTOMATIC: u8 = 1 << 4;
    pub const MODE_MANUAL: u8 = 1 << 5;
    pub const MODE_ALWAYS_OPEN: u8 = 1 << 6;
    pub const MODE_ALWAYS_CLOSED: u8 = 1 << 7;
}

/// Expander 1, port B: operator signals and inside sensors
pub mod ext1_b {
    pub const INSIDE_AIR: u8 = 1 << 0;
    pub const INSIDE_RADAR: u8 = 1 << 1;
    pub const LOCK_PULSE: u8 = 1 << 2;
    pub const OPERATOR_TEST: u8 = 1 << 3;
    pub const SECONDARY_EDGE: u8 = 1 << 4;
    pub const MAIN_EDGE: u8 = 1 << 5;
    pub const RELEASE: u8 = 1 << 6;
    pub const OPERATOR_POWER: u8 = 1 << 7;
}

/// Expander 2, port A: outside sensors and sensor test lines
pub mod ext2_a {
    pub const OUTSIDE_TEST: u8 = 1 << 4;
    pub const OUTSIDE_AIR: u8 = 1 << 5;
    pub const OUTSIDE_RADAR: u8 = 1 << 6;
    pub const INSIDE_TEST: u8 = 1 << 7;
}

/// Expander 2, port B: controller status
pub mod ext2_b {
    pub const RUNNING: u8 = 1 << 5;
    pub const LOCK_ACTIVE: u8 = 1 << 6;
    pub const LOCK_REQUESTED: u8 = 1 << 7;
}

#[inline]
fn set_bit(byte: &mut u8, mask: u8, on: bool) {
    if on {
        *byte |= mask;
    } else {
        *byte &= !mask;
    }
}

/// Four diagnostic port bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub struct DiagnosticPorts {
    pub ext1_a: u8,
    pub ext1_b: u8,
    pub ext2_a: u8,
    pub ext2_b: u8,
}

impl Default for DiagnosticPorts {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticPorts {
    /// Empty image with the running indicator lit
    pub const fn new() -> Self {
        Self {
            ext1_a: 0,
            ext1_b: 0,
            ext2_a: 0,
            ext2_b: ext2_b::RUNNING,
        }
    }

    /// Bytes in mirror order: expander 1 A/B, expander 2 A/B
    pub fn as_bytes(&self) -> [u8; 4] {
        [self.ext1_a, self.ext1_b, self.ext2_a, self.ext2_b]
    }

    pub fn set_switch_latched(&mut self, latched: bool) {
        set_bit(&mut self.ext1_a, ext1_a::SWITCH_INSIDE | ext1_a::SWITCH_OUTSIDE, latched);
    }

    pub fn set_position(&mut self, position: DoorPosition) {
        set_bit(&mut self.ext1_a, ext1_a::DOOR_OPEN, position == DoorPosition::Open);
        set_bit(&mut self.ext1_a, ext1_a::DOOR_CLOSED, position == DoorPosition::Closed);
    }

    pub fn set_mode(&mut self, mode: OperatingMode) {
        let bit = match mode {
            OperatingMode::AlwaysClosed => ext1_a::MODE_ALWAYS_CLOSED,
            OperatingMode::AlwaysOpen => ext1_a::MODE_ALWAYS_OPEN,
            OperatingMode::Manual => ext1_a::MODE_MANUAL,
            OperatingMode::Automatic => ext1_a::MODE_AUTOMATIC,
        };
        self.ext1_a &= !(ext1_a::MODE_AUTOMATIC
            | ext1_a::MODE_MANUAL
            | ext1_a::MODE_ALWAYS_OPEN
            | ext1_a::MODE_ALWAYS_CLOSED);
        self.ext1_a |= bit;
    }

    pub fn set_presence(&mut self, presence: &PresenceSnapshot) {
        set_bit(&mut self.ext1_b, ext1_b::INSIDE_AIR, presence.inside_air);
        set_bit(&mut self.ext1_b, ext1_b::INSIDE_RADAR, presence.inside_radar);
        set_bit(&mut self.ext2_a, ext2_a::OUTSIDE_AIR, presence.outside_air);
        set_bit(&mut self.ext2_a, ext2_a::OUTSIDE_RADAR, presence.outside_radar);
    }

    pub fn set_lock_pulse(&mut self, active: bool) {
        set_bit(&mut self.ext1_b, ext1_b::LOCK_PULSE, active);
    }

    pub fn set_operator_test(&mut self, active: bool) {
        set_bit(&mut self.ext1_b, ext1_b::OPERATOR_TEST, active);
    }

    pub fn set_edges(&mut self, main: bool, secondary: bool) {
        set_bit(&mut self.ext1_b, ext1_b::MAIN_EDGE, main);
        set_bit(&mut self.ext1_b, ext1_b::SECONDARY_EDGE, secondary);
    }

    pub fn set_release(&mut self, active: bool) {
        set_bit(&mut self.ext1_b, ext1_b::RELEASE, active);
    }

    pub fn set_operator_power(&mut self, present: bool) {
        set_bit(&mut self.ext1_b, ext1_b::OPERATOR_POWER, present);
    }

    /// Sensor test output drives both the inside and outside test lines
    pub fn set_sensor_test(&mut self, active: bool) {
        set_bit(&mut self.ext2_a, ext2_a::INSIDE_TEST | ext2_a::OUTSIDE_TEST, active);
    }

    pub fn set_lock(&mut self, active: bool, requested: bool) {
        set_bit(&mut self.ext2_b, ext2_b::LOCK_ACTIVE, active);
        set_bit(&mut self.ext2_b, ext2_b::LOCK_REQUESTED, requested);
    }
}

/// Writes changed port bytes to the expanders
#[derive(Debug, Clone, Default)]
pub struct DiagnosticMirror {
    last_sent: [Option<u8>; 4],
}

impl DiagnosticMirror {
    pub const fn new() -> Self {
        Self {
            last_sent: [None; 4],
        }
    }

    /// Forget what was sent so the next mirror rewrites every port
    pub fn invalidate(&mut self) {
        self.last_sent = [None; 4];
    }

    /// Mirror the image to expander 1 (ports A/B) and expander 2 (ports A/B)
    ///
    /// Returns `Ok(None)` when either expander is absent, otherwise the
    /// number of ports written. A failed write is retried on the next call.
    pub fn mirror<E: PortExpander>(
        &mut self,
        ports: &DiagnosticPorts,
        ext1: &mut E,
        ext2: &mut E,
    ) -> Result<Option<usize>, E::Error> {
        if !ext1.is_connected() || !ext2.is_connected() {
            return Ok(None);
        }

        let bytes = ports.as_bytes();
        let mut written = 0;

        for (index, &value) in bytes.iter().enumerate() {
            if self.last_sent[index] == Some(value) {
                continue;
            }

            let port = if index % 2 == 0 {
                ExpanderPort::A
            } else {
                ExpanderPort::B
            };
            let device = if index < 2 { &mut *ext1 } else { &mut *ext2 };

            device.write_port(port, value)?;
            self.last_sent[index] = Some(value);
            written += 1;
            trace!("diagnostic port {}: {=u8:#x}", index, value);
        }

        Ok(Some(written))
    }
}
