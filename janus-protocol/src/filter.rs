//! Change filter for frame reporting
//!
//! The door operator retransmits the same status frame continuously and the
//! sequencer repeats its final command frame forever. Reporting every copy
//! would flood the log, so reports are limited to payloads that differ from
//! the previous report. The filter never decides what gets delivered.

use heapless::Vec;

use crate::frame::MAX_PAYLOAD_SIZE;

/// Remembers the last reported payload
#[derive(Debug, Clone, Default)]
pub struct ChangeFilter {
    last: Option<Vec<u8, MAX_PAYLOAD_SIZE>>,
}

impl ChangeFilter {
    /// Create a filter that reports the first payload it sees
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Decide whether `payload` should be reported
    ///
    /// With `debug_output` set every payload is reported. The payload is
    /// remembered either way so that leaving debug mode does not re-report
    /// the current one.
    pub fn should_report(&mut self, payload: &[u8], debug_output: bool) -> bool {
        let changed = self.last.as_deref() != Some(payload);
        if changed {
            let mut copy = Vec::new();
            // Longer payloads are truncated; they still compare unequal
            let len = payload.len().min(MAX_PAYLOAD_SIZE);
            let _ = copy.extend_from_slice(&payload[..len]);
            self.last = Some(copy);
        }
        changed || debug_output
    }
}
