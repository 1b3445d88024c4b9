//! RP2040-specific HAL for the door controller firmware
//!
//! This crate provides RP2040 implementations of the shared `janus-hal`
//! traits:
//!
//! - Door operator UART (buffered transmit, pipe-fed receive)
//! - Blocking I2C master for the diagnostic expanders
//! - Flash storage driver (implements `janus_hal::FlashStorage`)

#![no_std]

pub mod flash;
pub mod i2c;
pub mod uart;
