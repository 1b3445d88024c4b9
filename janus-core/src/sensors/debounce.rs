//! Presence sensor debouncing
//!
//! Edge handlers run outside the control loop and may fire at any time. They
//! only store the latest raw level into a [`SensorCell`]. Once per control
//! cycle the [`PresenceDebouncer`] copies the raw levels into a stable
//! snapshot; every decision in that cycle reads the snapshot, so a sensor
//! can never change value halfway through a cycle.

#[cfg(feature = "defmt")]
use defmt::Format;
use portable_atomic::{AtomicBool, Ordering};

/// Latest raw level of one sensor, written from edge context
///
/// Single writer (the edge handler), single reader (the control loop).
#[derive(Debug)]
pub struct SensorCell {
    raw: AtomicBool,
}

impl Default for SensorCell {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorCell {
    pub const fn new() -> Self {
        Self {
            raw: AtomicBool::new(false),
        }
    }

    /// Record the sensor level (true = presence detected)
    #[inline]
    pub fn store(&self, active: bool) {
        self.raw.store(active, Ordering::Release);
    }

    /// Latest recorded level
    #[inline]
    pub fn load(&self) -> bool {
        self.raw.load(Ordering::Acquire)
    }
}

/// Raw cells for the four presence sensors
///
/// Radar sensors detect approach, air (light curtain) sensors detect a
/// person standing in the door swing.
#[derive(Debug, Default)]
pub struct EdgeInputs {
    pub inside_radar: SensorCell,
    pub inside_air: SensorCell,
    pub outside_radar: SensorCell,
    pub outside_air: SensorCell,
}

impl EdgeInputs {
    pub const fn new() -> Self {
        Self {
            inside_radar: SensorCell::new(),
            inside_air: SensorCell::new(),
            outside_radar: SensorCell::new(),
            outside_air: SensorCell::new(),
        }
    }
}

/// Stable presence levels for one control cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub struct PresenceSnapshot {
    pub inside_radar: bool,
    pub inside_air: bool,
    pub outside_radar: bool,
    pub outside_air: bool,
}

impl PresenceSnapshot {
    /// Either radar sees someone approaching
    pub fn any_radar(&self) -> bool {
        self.inside_radar || self.outside_radar
    }

    /// Either air sensor sees someone in the swing
    pub fn any_air(&self) -> bool {
        self.inside_air || self.outside_air
    }

    /// No sensor reports presence
    pub fn all_clear(&self) -> bool {
        !self.any_radar() && !self.any_air()
    }
}

/// Copies raw sensor levels into a stable snapshot once per cycle
#[derive(Debug, Clone, Default)]
pub struct PresenceDebouncer {
    stable: PresenceSnapshot,
}

impl PresenceDebouncer {
    pub const fn new() -> Self {
        Self {
            stable: PresenceSnapshot {
                inside_radar: false,
                inside_air: false,
                outside_radar: false,
                outside_air: false,
            },
        }
    }

    /// Snapshot from the last reconcile
    pub fn stable(&self) -> PresenceSnapshot {
        self.stable
    }

    /// Pull the raw levels into the stable snapshot
    ///
    /// Each sensor is copied only when it differs, and each change is logged.
    pub fn reconcile(&mut self, inputs: &EdgeInputs) -> PresenceSnapshot {
        Self::copy(&mut self.stable.inside_radar, &inputs.inside_radar, "inside radar");
        Self::copy(&mut self.stable.inside_air, &inputs.inside_air, "inside air");
        Self::copy(&mut self.stable.outside_radar, &inputs.outside_radar, "outside radar");
        Self::copy(&mut self.stable.outside_air, &inputs.outside_air, "outside air");
        self.stable
    }

    fn copy(stable: &mut bool, cell: &SensorCell, name: &'static str) {
        let raw = cell.load();
        if *stable != raw {
            *stable = raw;
            debug!("{} sensor: {}", name, raw);
        }
    }
}
