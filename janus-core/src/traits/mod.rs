//! Hardware abstraction traits
//!
//! These traits define the interface between the control logic
//! and the output drivers.

pub mod expander;
pub mod output;

pub use expander::{ExpanderPort, PortExpander};
pub use output::SignalOutput;
