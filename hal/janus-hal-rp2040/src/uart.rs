//! Door operator UART
//!
//! Transmit goes straight to the buffered UART. Receive is decoupled: an
//! async task drains the peripheral into a [`Pipe`], and the control loop
//! takes whatever has accumulated without waiting.

use core::convert::Infallible;

use embassy_rp::uart::{self, BufferedUartTx, DataBits, Parity, StopBits};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pipe::Pipe;
use embedded_io::Write;
use janus_hal::uart::{self as hal_uart, UartConfig};
use janus_hal::{UartRx, UartTx};

/// Receive pipe filled by the UART reader task
pub type RxPipe<const N: usize> = Pipe<CriticalSectionRawMutex, N>;

/// Convert the shared line settings to an embassy-rp UART config
pub fn rp_config(config: UartConfig) -> uart::Config {
    let mut rp = uart::Config::default();
    rp.baudrate = config.baudrate;
    rp.data_bits = match config.data_bits {
        hal_uart::DataBits::Seven => DataBits::DataBits7,
        hal_uart::DataBits::Eight => DataBits::DataBits8,
    };
    rp.parity = match config.parity {
        hal_uart::Parity::None => Parity::ParityNone,
        hal_uart::Parity::Even => Parity::ParityEven,
        hal_uart::Parity::Odd => Parity::ParityOdd,
    };
    rp.stop_bits = match config.stop_bits {
        hal_uart::StopBits::One => StopBits::STOP1,
        hal_uart::StopBits::Two => StopBits::STOP2,
    };
    rp
}

/// Door operator serial port
pub struct DoorUart<'p, const N: usize> {
    tx: BufferedUartTx,
    rx: &'p RxPipe<N>,
}

impl<'p, const N: usize> DoorUart<'p, N> {
    pub fn new(tx: BufferedUartTx, rx: &'p RxPipe<N>) -> Self {
        Self { tx, rx }
    }
}

impl<const N: usize> UartTx for DoorUart<'_, N> {
    type Error = uart::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.tx.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Write::flush(&mut self.tx)
    }
}

impl<const N: usize> UartRx for DoorUart<'_, N> {
    type Error = Infallible;

    fn try_read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        // An empty pipe is not an error for the control loop
        Ok(self.rx.try_read(buf).unwrap_or(0))
    }
}
