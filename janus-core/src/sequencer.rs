//! Outbound command sequencer
//!
//! The door operator expects a continuous stream of command frames. After a
//! command is selected, its prefix payloads are sent once each, in order,
//! and then its final payload repeats at the command interval until another
//! command is selected. There are no acknowledgements.

use janus_protocol::{ChangeFilter, CommandDefinition, CommandError, CommandId, DoorPayload};

use crate::time::has_elapsed;

/// Destination for outbound payloads
pub trait PayloadSink {
    /// Error type for send operations
    type Error;

    /// Frame and transmit one payload
    fn send_payload(&mut self, payload: &[u8]) -> Result<(), Self::Error>;
}

/// Emits the selected command's prefixes and then its repeating payload
#[derive(Debug, Clone)]
pub struct CommandSequencer {
    interval_ms: u32,
    definition: Option<&'static CommandDefinition>,
    prefix_index: usize,
    last_sent_at: Option<u32>,
    filter: ChangeFilter,
    debug_output: bool,
}

impl CommandSequencer {
    pub const fn new(interval_ms: u32, debug_output: bool) -> Self {
        Self {
            interval_ms,
            definition: None,
            prefix_index: 0,
            last_sent_at: None,
            filter: ChangeFilter::new(),
            debug_output,
        }
    }

    /// Currently selected command
    pub fn current(&self) -> Option<&'static CommandDefinition> {
        self.definition
    }

    /// Number of prefixes already sent for the current command
    pub fn prefixes_sent(&self) -> usize {
        self.prefix_index
    }

    /// Select a command, restarting its prefix sequence
    ///
    /// The next tick transmits immediately.
    pub fn select(&mut self, definition: &'static CommandDefinition) {
        self.definition = Some(definition);
        self.prefix_index = 0;
        self.last_sent_at = None;
        info!("command selected: {}", definition.name);
    }

    /// Select a command by token
    ///
    /// Unknown tokens leave the current selection untouched.
    pub fn select_token(&mut self, token: &str) -> Result<CommandId, CommandError> {
        let id = CommandId::from_token(token)?;
        self.select(id.definition());
        Ok(id)
    }

    /// Payload the next transmission will carry
    pub fn next_payload(&self) -> Option<&'static DoorPayload> {
        let definition = self.definition?;
        Some(
            definition
                .prefixes
                .get(self.prefix_index)
                .unwrap_or(&definition.payload),
        )
    }

    /// Transmit if the command interval has elapsed
    ///
    /// Returns true when a payload was sent. A failed send leaves the
    /// sequence where it was, so the same payload is retried next tick.
    pub fn tick<S: PayloadSink>(&mut self, now_ms: u32, sink: &mut S) -> Result<bool, S::Error> {
        let due = match self.last_sent_at {
            Some(at) => has_elapsed(now_ms, at, self.interval_ms),
            None => true,
        };
        if !due {
            return Ok(false);
        }

        let (Some(definition), Some(payload)) = (self.definition, self.next_payload()) else {
            return Ok(false);
        };

        sink.send_payload(payload)?;

        if self.prefix_index < definition.prefixes.len() {
            self.prefix_index += 1;
        }
        self.last_sent_at = Some(now_ms);

        if self.filter.should_report(payload, self.debug_output) {
            debug!("sent {}: {=[u8]:#x}", definition.name, payload.as_slice());
        }

        Ok(true)
    }
}
