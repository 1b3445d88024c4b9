//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in janus-core:
//!
//! - Signal outputs on GPIO pins with a configurable active level
//! - TCA9555 16-bit I2C port expander for diagnostic LEDs

#![no_std]
#![deny(unsafe_code)]

pub mod expander;
pub mod output;
