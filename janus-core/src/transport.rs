//! Door operator serial transport
//!
//! Owns the UART for the lifetime of the controller. Inbound bytes are
//! drained on every poll and decoded into payloads, which are queued for
//! diagnostics. Framing errors are counted and the decoder resynchronises on
//! its own; none of them is fatal.

#[cfg(feature = "defmt")]
use defmt::Format;

use janus_hal::{Uart, UartRx, UartTx};
use janus_protocol::{
    encode_to_vec, ChangeFilter, FrameDecoder, FrameError, MessageCallback, MessageQueue, Payload,
};

use crate::sequencer::PayloadSink;

/// Bytes pulled from the port per read
const READ_CHUNK: usize = 32;

/// Transport errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub enum TransportError<E> {
    /// UART reported an error
    Port(E),
    /// Payload could not be framed
    Frame(FrameError),
}

impl<E> From<FrameError> for TransportError<E> {
    fn from(e: FrameError) -> Self {
        TransportError::Frame(e)
    }
}

/// Link statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub struct TransportStatus {
    /// Payloads waiting in the inbound queue
    pub queue_depth: usize,
    /// Valid frames decoded
    pub frames_received: u32,
    /// Frames written to the port
    pub frames_sent: u32,
    /// Frames discarded for a bad checksum
    pub checksum_errors: u32,
    /// Frames discarded for an invalid escape
    pub escape_errors: u32,
    /// Frames discarded for exceeding the payload limit
    pub oversize_errors: u32,
    /// Payloads dropped from a full queue
    pub dropped_messages: u32,
}

/// Serial transport to the door operator
pub struct DoorTransport<P: Uart> {
    port: P,
    decoder: FrameDecoder,
    queue: MessageQueue,
    filter: ChangeFilter,
    debug_output: bool,
    status: TransportStatus,
}

impl<P: Uart> DoorTransport<P> {
    pub fn new(port: P, debug_output: bool) -> Self {
        Self {
            port,
            decoder: FrameDecoder::new(),
            queue: MessageQueue::new(),
            filter: ChangeFilter::new(),
            debug_output,
            status: TransportStatus::default(),
        }
    }

    /// Register (or clear) the new-message callback
    pub fn set_callback(&mut self, callback: Option<MessageCallback>) {
        self.queue.set_callback(callback);
    }

    /// Drain available bytes from the port through the decoder
    ///
    /// Returns the number of payloads queued.
    pub fn poll(&mut self) -> Result<usize, TransportError<<P as UartRx>::Error>> {
        let mut chunk = [0u8; READ_CHUNK];
        let mut queued = 0;

        loop {
            let count = self.port.try_read(&mut chunk).map_err(TransportError::Port)?;
            if count == 0 {
                break;
            }

            for &byte in &chunk[..count] {
                match self.decoder.feed(byte) {
                    Ok(Some(payload)) => {
                        self.accept(payload);
                        queued += 1;
                    }
                    Ok(None) => {}
                    Err(e) => self.record_error(e),
                }
            }
        }

        Ok(queued)
    }

    fn accept(&mut self, payload: Payload) {
        self.status.frames_received = self.status.frames_received.wrapping_add(1);

        if self.filter.should_report(&payload, self.debug_output) {
            debug!("received: {=[u8]:#x}", payload.as_slice());
        }

        if self.queue.push(payload).is_some() {
            self.status.dropped_messages = self.status.dropped_messages.wrapping_add(1);
            trace!("inbound queue full, dropped oldest");
        }
    }

    fn record_error(&mut self, error: FrameError) {
        let counter = match error {
            FrameError::ChecksumMismatch { .. } => &mut self.status.checksum_errors,
            FrameError::UnexpectedEscape(_) => &mut self.status.escape_errors,
            FrameError::Oversize => &mut self.status.oversize_errors,
            // Encoder-side errors never come out of the decoder
            FrameError::PayloadTooLarge | FrameError::BufferTooSmall => return,
        };
        *counter = counter.wrapping_add(1);
        warn!("frame discarded: {}", error);
    }

    /// Frame and write one payload
    ///
    /// The port is flushed so the frame is on the wire when this returns.
    pub fn send(&mut self, payload: &[u8]) -> Result<(), TransportError<<P as UartTx>::Error>> {
        let frame = encode_to_vec(payload)?;
        self.port
            .write_blocking(&frame)
            .map_err(TransportError::Port)?;
        self.port.flush().map_err(TransportError::Port)?;
        self.status.frames_sent = self.status.frames_sent.wrapping_add(1);
        Ok(())
    }

    /// Take the oldest inbound payload
    pub fn pop_message(&mut self) -> Option<Payload> {
        self.queue.pop()
    }

    /// Number of queued inbound payloads
    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    /// Link statistics
    pub fn status(&self) -> TransportStatus {
        TransportStatus {
            queue_depth: self.queue.len(),
            ..self.status
        }
    }

    /// Access the underlying port
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }
}

impl<P: Uart> PayloadSink for DoorTransport<P> {
    type Error = TransportError<<P as UartTx>::Error>;

    fn send_payload(&mut self, payload: &[u8]) -> Result<(), Self::Error> {
        self.send(payload)
    }
}
