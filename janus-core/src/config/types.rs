//! Configuration type definitions

#[cfg(feature = "defmt")]
use defmt::Format;

use crate::sensors::Hysteresis;

/// Door operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[repr(u8)]
pub enum OperatingMode {
    /// Door held closed, sensors ignored
    AlwaysClosed = 0,
    /// Door held open, sensors ignored
    AlwaysOpen = 1,
    /// Door moves on switch triggers only
    Manual = 2,
    /// Door moves on radar presence
    #[default]
    Automatic = 3,
}

impl OperatingMode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(OperatingMode::AlwaysClosed),
            1 => Some(OperatingMode::AlwaysOpen),
            2 => Some(OperatingMode::Manual),
            3 => Some(OperatingMode::Automatic),
            _ => None,
        }
    }

    /// Whether the door state machine runs in this mode
    pub fn is_active(self) -> bool {
        matches!(self, OperatingMode::Manual | OperatingMode::Automatic)
    }
}

/// Which air sensors drive a closing-edge safety output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(Format))]
#[repr(u8)]
pub enum SafetySource {
    /// Output never asserted
    None = 0,
    Inside = 1,
    Outside = 2,
    /// Either air sensor asserts the output
    #[default]
    Both = 3,
}

/// Controller timing and thresholds
///
/// Defaults are the values the controller is tuned to in the field: 10-bit
/// ADC counts with 220 Ω end-stop sensor resistors, and the pulse lengths
/// the door operator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub struct DoorConfig {
    /// Minimum time the door stays open before an automatic close
    pub min_open_ms: u32,
    /// Time in `Transition` without a position change before re-evaluating
    pub transition_timeout_ms: u32,
    /// Length of the release and lock relay pulses
    pub signal_pulse_ms: u32,
    /// Interval between release reminders while a lock request waits
    pub lock_reminder_interval_ms: u32,
    /// Minimum interval between command frames
    pub command_interval_ms: u32,
    /// End-stop sensors
    pub position: Hysteresis,
    /// Door operator power sense (active above)
    pub power: Hysteresis,
    /// Door operator test request (active below)
    pub test_signal: Hysteresis,
    /// Sensors feeding the main closing edge (HSK) output
    pub main_edge_source: SafetySource,
    /// Sensors feeding the secondary closing edge (NSK) output
    pub secondary_edge_source: SafetySource,
    /// Report every frame instead of only changes
    pub debug_output: bool,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            min_open_ms: 3000,
            transition_timeout_ms: 3000,
            signal_pulse_ms: 100,
            lock_reminder_interval_ms: 3000,
            command_interval_ms: 100,
            position: Hysteresis::new(500, 10),
            power: Hysteresis::new(500, 50),
            test_signal: Hysteresis::new(500, 50),
            main_edge_source: SafetySource::Both,
            secondary_edge_source: SafetySource::Both,
            debug_output: false,
        }
    }
}
