//! Safety-edge protection mapping

use crate::config::SafetySource;
use crate::sensors::PresenceSnapshot;

impl SafetySource {
    /// Whether this source asserts given the cycle's presence snapshot
    pub fn is_triggered(self, presence: &PresenceSnapshot) -> bool {
        match self {
            SafetySource::None => false,
            SafetySource::Inside => presence.inside_air,
            SafetySource::Outside => presence.outside_air,
            SafetySource::Both => presence.any_air(),
        }
    }
}

/// Main (HSK) and secondary (NSK) closing-edge outputs
#[derive(Debug, Clone, Copy)]
pub struct EdgeProtection {
    main_source: SafetySource,
    secondary_source: SafetySource,
    main_active: bool,
    secondary_active: bool,
}

impl EdgeProtection {
    pub const fn new(main_source: SafetySource, secondary_source: SafetySource) -> Self {
        Self {
            main_source,
            secondary_source,
            main_active: false,
            secondary_active: false,
        }
    }

    /// Main edge output asserted
    pub fn main_active(&self) -> bool {
        self.main_active
    }

    /// Secondary edge output asserted
    pub fn secondary_active(&self) -> bool {
        self.secondary_active
    }

    /// Re-evaluate both outputs
    ///
    /// Returns true when either output changed.
    pub fn update(&mut self, presence: &PresenceSnapshot) -> bool {
        let main = self.main_source.is_triggered(presence);
        let secondary = self.secondary_source.is_triggered(presence);
        let mut changed = false;

        if main != self.main_active {
            self.main_active = main;
            changed = true;
            debug!("main edge: {}", main);
        }

        if secondary != self.secondary_active {
            self.secondary_active = secondary;
            changed = true;
            debug!("secondary edge: {}", secondary);
        }

        changed
    }
}
