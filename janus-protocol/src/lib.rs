//! Door Operator Serial Protocol
//!
//! This crate defines the UART protocol between the Janus controller and the
//! swing-door operator. The operator expects a continuous stream of command
//! frames and answers with status frames of its own.
//!
//! # Protocol Overview
//!
//! All messages use a DLE/STX byte-stuffed frame:
//! ```text
//! ┌─────────┬──────────────────────┬─────────┬──────────┐
//! │ DLE STX │ PAYLOAD (DLE → DLE²) │ DLE ETX │ CHECKSUM │
//! │ 2B      │ 0–128B before stuff  │ 2B      │ 1B       │
//! └─────────┴──────────────────────┴─────────┴──────────┘
//! ```
//!
//! The checksum is the XOR of the payload bytes as they appear on the wire.
//! There are no sequence numbers or acknowledgements; the link is open loop.

#![no_std]
#![deny(unsafe_code)]

pub mod commands;
pub mod filter;
pub mod frame;
pub mod queue;

pub use commands::{CommandDefinition, CommandError, CommandId, DoorPayload, COMMAND_PAYLOAD_SIZE};
pub use filter::ChangeFilter;
pub use frame::{
    encode, encode_to_vec, encoded_len, DecodeState, FrameDecoder, FrameError, Payload, DLE, ETX,
    MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE, STX,
};
pub use queue::{MessageCallback, MessageQueue, DEFAULT_QUEUE_DEPTH};
