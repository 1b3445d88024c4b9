//! Closing-edge safety outputs
//!
//! The door operator stops or reverses when a closing-edge input is
//! asserted. The controller asserts those inputs from the air sensors.

pub mod protection;

pub use protection::EdgeProtection;
