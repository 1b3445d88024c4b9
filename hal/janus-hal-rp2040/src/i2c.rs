//! Blocking I2C master
//!
//! The expander bus is serviced from the control loop between ticks, and a
//! two-byte register write at 100 kHz is short enough to do blocking.

use embassy_rp::i2c::{self, Blocking, I2c, Instance, SclPin, SdaPin};
use embassy_rp::Peri;
use janus_hal::i2c::I2cConfig;
use janus_hal::I2cBus;

/// RP2040 I2C peripheral in blocking mode
pub struct Rp2040I2c<'d, T: Instance> {
    i2c: I2c<'d, T, Blocking>,
}

impl<'d, T: Instance> Rp2040I2c<'d, T> {
    pub fn new(
        peri: Peri<'d, T>,
        scl: Peri<'d, impl SclPin<T>>,
        sda: Peri<'d, impl SdaPin<T>>,
        config: I2cConfig,
    ) -> Self {
        let mut rp_config = i2c::Config::default();
        rp_config.frequency = config.frequency;
        Self {
            i2c: I2c::new_blocking(peri, scl, sda, rp_config),
        }
    }
}

impl<T: Instance> I2cBus for Rp2040I2c<'_, T> {
    type Error = i2c::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.i2c.blocking_write(address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.blocking_read(address, buf)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.i2c.blocking_write_read(address, write_data, read_buf)
    }
}
