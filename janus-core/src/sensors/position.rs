//! Door position from the two end-stop sensors
//!
//! The door carries one analog sensor at the open end stop and one at the
//! closed end stop. A sensor reads low when the door is at its stop. Leaving
//! a stop is reported as motion away from it (Closing, Opening) until the
//! other stop is reached.

#[cfg(feature = "defmt")]
use defmt::Format;

use super::threshold::Hysteresis;

/// Door position as derived from the end-stop sensors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub enum DoorPosition {
    Closed,
    Closing,
    Open,
    Opening,
    /// No end stop seen since power-up
    Undefined,
}

/// Tracks door position across cycles
#[derive(Debug, Clone, Copy)]
pub struct PositionTracker {
    band: Hysteresis,
    position: DoorPosition,
}

impl PositionTracker {
    pub const fn new(band: Hysteresis) -> Self {
        Self {
            band,
            position: DoorPosition::Undefined,
        }
    }

    /// Current position
    pub fn position(&self) -> DoorPosition {
        self.position
    }

    /// Feed one reading of each end-stop sensor
    ///
    /// Returns the new position when it changed. The closed sensor is
    /// evaluated last and wins if both stops claim the door.
    pub fn update(&mut self, open_reading: u16, closed_reading: u16) -> Option<DoorPosition> {
        let previous = self.position;
        let mut position = previous;

        if self.band.is_below(open_reading) {
            position = DoorPosition::Open;
        } else if self.band.is_above(open_reading) && position == DoorPosition::Open {
            position = DoorPosition::Closing;
        }

        if self.band.is_below(closed_reading) {
            position = DoorPosition::Closed;
        } else if self.band.is_above(closed_reading) && position == DoorPosition::Closed {
            position = DoorPosition::Opening;
        }

        if position == previous {
            return None;
        }

        debug!(
            "door position: {} (open={}, closed={})",
            position, open_reading, closed_reading
        );
        self.position = position;
        Some(position)
    }
}
