//! Door operator UART receive task
//!
//! Moves raw bytes from the UART into [`RX_PIPE`]. Frame decoding happens
//! on the control loop, so this task never parses anything.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use crate::channels::RX_PIPE;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 32;

#[embassy_executor::task]
pub async fn door_rx_task(mut rx: BufferedUartRx) {
    info!("Door RX task started");

    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);
                let stored = RX_PIPE.try_write(&buf[..n]).unwrap_or(0);
                if stored < n {
                    warn!("RX pipe full, dropped {} bytes", n - stored);
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}
