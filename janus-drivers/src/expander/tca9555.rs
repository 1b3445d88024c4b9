//! TCA9555 16-bit I2C port expander
//!
//! Register map (8-bit registers, port 0 = A, port 1 = B):
//! - 0x00/0x01: input
//! - 0x02/0x03: output
//! - 0x04/0x05: polarity inversion
//! - 0x06/0x07: configuration (1 = input, 0 = output)

use janus_core::traits::{ExpanderPort, PortExpander};
use janus_hal::I2cBus;

/// Base address with A2..A0 strapped low
pub const BASE_ADDRESS: u8 = 0x20;

const REG_INPUT_0: u8 = 0x00;
const REG_OUTPUT_0: u8 = 0x02;
const REG_CONFIG_0: u8 = 0x06;

/// TCA9555 driver
pub struct Tca9555<B> {
    bus: B,
    address: u8,
}

impl<B: I2cBus> Tca9555<B> {
    /// Create a driver for the device at `address`
    pub fn new(bus: B, address: u8) -> Self {
        Self { bus, address }
    }

    /// Device address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Read both input ports (A in the low byte)
    pub fn read_inputs(&mut self) -> Result<u16, B::Error> {
        let mut buf = [0u8; 2];
        self.bus.write_read(self.address, &[REG_INPUT_0], &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn port_offset(port: ExpanderPort) -> u8 {
        match port {
            ExpanderPort::A => 0,
            ExpanderPort::B => 1,
        }
    }
}

impl<B: I2cBus> PortExpander for Tca9555<B> {
    type Error = B::Error;

    fn is_connected(&mut self) -> bool {
        self.read_inputs().is_ok()
    }

    fn init_outputs(&mut self) -> Result<(), Self::Error> {
        // Auto-increment covers both configuration registers
        self.bus.write(self.address, &[REG_CONFIG_0, 0x00, 0x00])
    }

    fn write_port(&mut self, port: ExpanderPort, value: u8) -> Result<(), Self::Error> {
        let register = REG_OUTPUT_0 + Self::port_offset(port);
        self.bus.write(self.address, &[register, value])
    }
}
