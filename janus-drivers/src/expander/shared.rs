//! Shared I2C bus
//!
//! Both diagnostic expanders sit on one bus. The control loop is the only
//! user, so a `RefCell` is enough to hand each driver its own handle.

use core::cell::RefCell;

use janus_hal::I2cBus;

/// Handle to a bus shared within one execution context
pub struct SharedBus<'a, B> {
    bus: &'a RefCell<B>,
}

impl<'a, B> SharedBus<'a, B> {
    pub fn new(bus: &'a RefCell<B>) -> Self {
        Self { bus }
    }
}

impl<B: I2cBus> I2cBus for SharedBus<'_, B> {
    type Error = B::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.bus.borrow_mut().write(address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.bus.borrow_mut().read(address, buf)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.bus.borrow_mut().write_read(address, write_data, read_buf)
    }
}
