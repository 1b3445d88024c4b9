//! Board-agnostic control logic for the swing-door controller
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Presence sensor debouncing and analog threshold hysteresis
//! - Door position tracking from the end-stop sensors
//! - Door/lock state machine with relay pulses
//! - Closing-edge safety outputs
//! - Outbound command sequencing and the operator serial transport
//! - Diagnostic port image for the expander LEDs
//! - Configuration and persisted settings
//!
//! [`controller::DoorController`] ties these together into one control
//! cycle.

#![no_std]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod door;
pub mod safety;
pub mod sensors;
pub mod sequencer;
pub mod time;
pub mod traits;
pub mod transport;

pub use controller::{AnalogReadings, ControllerStatus, DoorController, DoorOutputs};
