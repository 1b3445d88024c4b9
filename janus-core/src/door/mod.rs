//! Door and lock control
//!
//! Fuses door position, operating mode, lock requests and presence into
//! the release and lock relay pulses that drive the door operator.

pub mod machine;
pub mod pulse;

pub use machine::{ControlState, DoorCommand, DoorInputs, DoorStateMachine, SwitchSide};
pub use pulse::Pulse;
