//! One-shot relay pulse

use crate::time::has_elapsed;

/// Fixed-length pulse on a relay output
///
/// The output is held only while the pulse runs; [`Pulse::expire`] must be
/// called every cycle to end it.
#[derive(Debug, Clone, Copy)]
pub struct Pulse {
    length_ms: u32,
    started_at: Option<u32>,
}

impl Pulse {
    pub const fn new(length_ms: u32) -> Self {
        Self {
            length_ms,
            started_at: None,
        }
    }

    /// Whether the output is currently energised
    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    /// Start the pulse
    pub fn start(&mut self, now_ms: u32) {
        self.started_at = Some(now_ms);
    }

    /// End the pulse once its length has elapsed
    ///
    /// Returns true on the cycle the pulse ends.
    pub fn expire(&mut self, now_ms: u32) -> bool {
        match self.started_at {
            Some(start) if has_elapsed(now_ms, start, self.length_ms) => {
                self.started_at = None;
                true
            }
            _ => false,
        }
    }
}
