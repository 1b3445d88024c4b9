//! Analog threshold detection with hysteresis
//!
//! ADC readings near the switching point jitter by a few counts. A reading
//! only counts as past the threshold once it clears it by the margin, so
//! noise inside the band never toggles the state.

#[cfg(feature = "defmt")]
use defmt::Format;

/// Threshold with a symmetric dead band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub struct Hysteresis {
    /// Switching point in raw ADC counts
    pub threshold: u16,
    /// Half-width of the dead band in raw ADC counts
    pub margin: u16,
}

impl Hysteresis {
    pub const fn new(threshold: u16, margin: u16) -> Self {
        Self { threshold, margin }
    }

    /// Reading is clearly above the band
    pub fn is_above(&self, reading: u16) -> bool {
        reading > self.threshold.saturating_add(self.margin)
    }

    /// Reading is clearly below the band
    ///
    /// The lower edge is inclusive.
    pub fn is_below(&self, reading: u16) -> bool {
        reading <= self.threshold.saturating_sub(self.margin)
    }

    /// Reading is below the band, not counting the lower edge itself
    pub fn is_strictly_below(&self, reading: u16) -> bool {
        reading < self.threshold.saturating_sub(self.margin)
    }
}

/// Which side of the threshold means "active"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub enum Polarity {
    /// Active when the reading rises above the band
    ActiveAbove,
    /// Active when the reading falls below the band
    ///
    /// A reading on the lower edge does not activate.
    ActiveBelow,
}

/// Two-state analog input
#[derive(Debug, Clone, Copy)]
pub struct HysteresisSwitch {
    band: Hysteresis,
    polarity: Polarity,
    active: bool,
}

impl HysteresisSwitch {
    /// Create a switch that starts inactive
    pub const fn new(band: Hysteresis, polarity: Polarity) -> Self {
        Self {
            band,
            polarity,
            active: false,
        }
    }

    /// Current state
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Feed a reading
    ///
    /// Returns the new state when it changed.
    pub fn update(&mut self, reading: u16) -> Option<bool> {
        let (activate, deactivate) = match self.polarity {
            Polarity::ActiveAbove => (self.band.is_above(reading), self.band.is_below(reading)),
            Polarity::ActiveBelow => (
                self.band.is_strictly_below(reading),
                self.band.is_above(reading),
            ),
        };

        if activate && !self.active {
            self.active = true;
            Some(true)
        } else if deactivate && self.active {
            self.active = false;
            Some(false)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BAND: Hysteresis = Hysteresis::new(500, 50);

    #[test]
    fn test_band_edges() {
        assert!(BAND.is_below(450));
        assert!(!BAND.is_below(451));
        assert!(BAND.is_strictly_below(449));
        assert!(!BAND.is_strictly_below(450));
        assert!(!BAND.is_above(550));
        assert!(BAND.is_above(551));
    }

    #[test]
    fn test_band_saturates() {
        let band = Hysteresis::new(10, 50);
        assert!(band.is_below(0));
        assert!(!band.is_below(1));

        let band = Hysteresis::new(u16::MAX - 10, 50);
        assert!(!band.is_above(u16::MAX));
    }

    #[test]
    fn test_active_above() {
        let mut power = HysteresisSwitch::new(BAND, Polarity::ActiveAbove);
        assert_eq!(power.update(600), Some(true));
        assert_eq!(power.update(700), None);
        assert_eq!(power.update(400), Some(false));
        assert!(!power.is_active());
    }

    #[test]
    fn test_active_below() {
        let mut test_signal = HysteresisSwitch::new(BAND, Polarity::ActiveBelow);
        assert_eq!(test_signal.update(600), None);
        assert_eq!(test_signal.update(100), Some(true));
        assert_eq!(test_signal.update(600), Some(false));
    }

    #[test]
    fn test_active_below_lower_edge_does_not_activate() {
        let mut test_signal = HysteresisSwitch::new(BAND, Polarity::ActiveBelow);
        assert_eq!(test_signal.update(450), None);
        assert!(!test_signal.is_active());
        assert_eq!(test_signal.update(449), Some(true));
    }

    #[test]
    fn test_active_above_lower_edge_deactivates() {
        let mut power = HysteresisSwitch::new(BAND, Polarity::ActiveAbove);
        power.update(600);
        assert_eq!(power.update(450), Some(false));
    }

    #[test]
    fn test_no_chatter_inside_band() {
        let mut power = HysteresisSwitch::new(BAND, Polarity::ActiveAbove);
        power.update(600);

        for reading in [549, 451, 500, 520, 470, 451] {
            assert_eq!(power.update(reading), None);
            assert!(power.is_active());
        }

        assert_eq!(power.update(450), Some(false));
        for reading in [451, 549, 500, 550] {
            assert_eq!(power.update(reading), None);
            assert!(!power.is_active());
        }
    }
}
