//! Janus Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the door controller core is
//! written against. Chip-specific crates implement them so the control
//! logic can be tested on the host with mock peripherals.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  janus-core / janus-drivers             │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  janus-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ janus-hal-    │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartTx`], [`uart::UartRx`] - Door operator serial link
//! - [`i2c::I2cBus`] - Diagnostic port expanders
//! - [`flash::FlashStorage`] - Persistent operating mode

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod i2c;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use flash::{FlashError, FlashStorage, StorageKey};
pub use i2c::I2cBus;
pub use uart::{Uart, UartRx, UartTx};
