//! Outbound door operator commands
//!
//! Every command is a fixed 8-byte payload. Some commands must be preceded
//! by setup payloads (prefixes) that are sent exactly once, in order, before
//! the final payload starts repeating.
//!
//! The byte values are installation data for the operator firmware in the
//! field. Byte 0 is the operator address and is 0x10, so every command
//! frame exercises DLE stuffing.

/// Size of every outbound command payload
pub const COMMAND_PAYLOAD_SIZE: usize = 8;

/// One outbound command payload
pub type DoorPayload = [u8; COMMAND_PAYLOAD_SIZE];

/// Immutable description of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDefinition {
    /// Symbolic name, also the token accepted from collaborators
    pub name: &'static str,
    /// Payload repeated once all prefixes are sent
    pub payload: DoorPayload,
    /// Payloads sent once, in order, before `payload`
    pub prefixes: &'static [DoorPayload],
}

impl CommandDefinition {
    /// Total number of distinct transmissions before the final payload repeats
    pub fn distinct_transmissions(&self) -> usize {
        self.prefixes.len() + 1
    }
}

/// Errors from the command token surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Token does not name a known command
    UnknownToken,
}

const INIT1: DoorPayload = [0x10, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01];
const INIT2: DoorPayload = [0x10, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02];
const OPEN: DoorPayload = [0x10, 0x20, 0x01, 0x00, 0x64, 0x00, 0x00, 0x45];
const OPENING: DoorPayload = [0x10, 0x21, 0x01, 0x00, 0x00, 0x00, 0x00, 0x20];
const CLOSE: DoorPayload = [0x10, 0x20, 0x02, 0x00, 0x64, 0x00, 0x00, 0x46];
const CLOSING: DoorPayload = [0x10, 0x21, 0x02, 0x00, 0x00, 0x00, 0x00, 0x23];
const CLOSED: DoorPayload = [0x10, 0x22, 0x02, 0x10, 0x00, 0x00, 0x00, 0x30];

const SETUP: &[DoorPayload] = &[INIT1, INIT2];

static DEFINITIONS: [CommandDefinition; 7] = [
    CommandDefinition { name: "init1", payload: INIT1, prefixes: &[] },
    CommandDefinition { name: "init2", payload: INIT2, prefixes: &[INIT1] },
    CommandDefinition { name: "open", payload: OPEN, prefixes: SETUP },
    CommandDefinition { name: "opening", payload: OPENING, prefixes: &[] },
    CommandDefinition { name: "close", payload: CLOSE, prefixes: SETUP },
    CommandDefinition { name: "closing", payload: CLOSING, prefixes: &[] },
    CommandDefinition { name: "closed", payload: CLOSED, prefixes: &[] },
];

/// Known commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CommandId {
    Init1 = 0,
    Init2 = 1,
    Open = 2,
    Opening = 3,
    Close = 4,
    Closing = 5,
    Closed = 6,
}

impl CommandId {
    /// All commands in table order
    pub const ALL: [CommandId; 7] = [
        CommandId::Init1,
        CommandId::Init2,
        CommandId::Open,
        CommandId::Opening,
        CommandId::Close,
        CommandId::Closing,
        CommandId::Closed,
    ];

    /// Look up a command by its token
    pub fn from_token(token: &str) -> Result<Self, CommandError> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.token() == token)
            .ok_or(CommandError::UnknownToken)
    }

    /// Token naming this command
    pub fn token(self) -> &'static str {
        self.definition().name
    }

    /// Static definition for this command
    pub fn definition(self) -> &'static CommandDefinition {
        &DEFINITIONS[self as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::DLE;

    #[test]
    fn test_tokens_resolve() {
        for id in CommandId::ALL {
            assert_eq!(CommandId::from_token(id.token()), Ok(id));
        }
        assert_eq!(CommandId::from_token("open"), Ok(CommandId::Open));
        assert_eq!(CommandId::from_token("closed"), Ok(CommandId::Closed));
    }

    #[test]
    fn test_unknown_token_rejected() {
        assert_eq!(CommandId::from_token("lock"), Err(CommandError::UnknownToken));
        assert_eq!(CommandId::from_token(""), Err(CommandError::UnknownToken));
        assert_eq!(CommandId::from_token("OPEN"), Err(CommandError::UnknownToken));
    }

    #[test]
    fn test_table_matches_ids() {
        for (index, id) in CommandId::ALL.iter().enumerate() {
            assert_eq!(*id as usize, index);
            assert_eq!(id.definition().name, DEFINITIONS[index].name);
        }
    }

    #[test]
    fn test_prefix_counts() {
        assert_eq!(CommandId::Init1.definition().distinct_transmissions(), 1);
        assert_eq!(CommandId::Init2.definition().distinct_transmissions(), 2);
        assert_eq!(CommandId::Open.definition().distinct_transmissions(), 3);
        assert_eq!(CommandId::Close.definition().prefixes, SETUP);
    }

    #[test]
    fn test_payloads_start_with_address() {
        for id in CommandId::ALL {
            assert_eq!(id.definition().payload[0], DLE);
        }
    }
}
