//! Frame encoding and decoding for the door operator link.
//!
//! Frame format:
//! - DLE STX (2 bytes): start of frame
//! - PAYLOAD (0-128 bytes): stuffed payload, every DLE doubled
//! - DLE ETX (2 bytes): end of frame
//! - CHECKSUM (1 byte): XOR of the stuffed payload bytes as transmitted
//!
//! Only DLE is special inside a frame, so STX and ETX may appear in the
//! payload unescaped.

use heapless::Vec;

/// Data link escape
pub const DLE: u8 = 0x10;

/// Start of text (follows DLE to open a frame)
pub const STX: u8 = 0x02;

/// End of text (follows DLE to close a frame)
pub const ETX: u8 = 0x03;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 128;

/// Maximum complete frame size (every payload byte doubled plus framing)
pub const MAX_FRAME_SIZE: usize = 2 + 2 * MAX_PAYLOAD_SIZE + 2 + 1;

/// A decoded payload
pub type Payload = Vec<u8, MAX_PAYLOAD_SIZE>;

/// Errors that can occur during frame decoding or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
    /// DLE followed by something other than DLE or ETX
    UnexpectedEscape(u8),
    /// Checksum byte did not match the computed value
    ChecksumMismatch { expected: u8, received: u8 },
    /// Frame grew past `MAX_PAYLOAD_SIZE` before it was closed
    Oversize,
}

/// Number of bytes `encode` writes for this payload
pub fn encoded_len(payload: &[u8]) -> usize {
    let escapes = payload.iter().filter(|&&b| b == DLE).count();
    2 + payload.len() + escapes + 2 + 1
}

/// Encode a payload into a byte buffer
///
/// Returns the number of bytes written.
pub fn encode(payload: &[u8], buffer: &mut [u8]) -> Result<usize, FrameError> {
    let frame_len = encoded_len(payload);
    if buffer.len() < frame_len {
        return Err(FrameError::BufferTooSmall);
    }

    buffer[0] = DLE;
    buffer[1] = STX;

    let mut pos = 2;
    let mut sum = 0u8;
    for &byte in payload {
        if byte == DLE {
            buffer[pos] = DLE;
            buffer[pos + 1] = DLE;
            pos += 2;
            sum ^= DLE;
            sum ^= DLE;
        } else {
            buffer[pos] = byte;
            pos += 1;
            sum ^= byte;
        }
    }

    buffer[pos] = DLE;
    buffer[pos + 1] = ETX;
    buffer[pos + 2] = sum;

    Ok(frame_len)
}

/// Encode a payload into a heapless Vec
pub fn encode_to_vec(payload: &[u8]) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(FrameError::PayloadTooLarge);
    }

    let mut buffer = [0u8; MAX_FRAME_SIZE];
    let len = encode(payload, &mut buffer)?;
    let mut vec = Vec::new();
    vec.extend_from_slice(&buffer[..len])
        .map_err(|_| FrameError::BufferTooSmall)?;
    Ok(vec)
}

/// State machine for decoding incoming frames
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: DecodeState,
    buffer: Payload,
    checksum: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeState {
    /// Waiting for DLE
    Idle,
    /// Got DLE, waiting for STX
    AwaitStx,
    /// Reading payload bytes
    InFrame,
    /// Got DLE inside a frame, waiting for DLE or ETX
    AfterDle,
    /// Got DLE ETX, waiting for CHECKSUM
    AwaitChecksum,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Create a new frame decoder
    pub const fn new() -> Self {
        Self {
            state: DecodeState::Idle,
            buffer: Vec::new(),
            checksum: 0,
        }
    }

    /// Reset the decoder state
    pub fn reset(&mut self) {
        self.state = DecodeState::Idle;
        self.buffer.clear();
        self.checksum = 0;
    }

    /// Current decoder state
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// Feed a single byte to the decoder
    ///
    /// Returns `Ok(Some(payload))` when a complete valid frame is decoded,
    /// `Ok(None)` when more bytes are needed, or `Err` when the frame in
    /// progress was discarded. The decoder is back in `Idle` after any error.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Payload>, FrameError> {
        match self.state {
            DecodeState::Idle => {
                if byte == DLE {
                    self.state = DecodeState::AwaitStx;
                }
                Ok(None)
            }
            DecodeState::AwaitStx => {
                if byte == STX {
                    self.buffer.clear();
                    self.checksum = 0;
                    self.state = DecodeState::InFrame;
                } else if byte != DLE {
                    self.state = DecodeState::Idle;
                }
                Ok(None)
            }
            DecodeState::InFrame => {
                if byte == DLE {
                    self.state = DecodeState::AfterDle;
                    return Ok(None);
                }
                self.append(byte)?;
                self.checksum ^= byte;
                Ok(None)
            }
            DecodeState::AfterDle => match byte {
                DLE => {
                    self.append(DLE)?;
                    // Both transmitted DLEs count towards the checksum
                    self.checksum ^= DLE;
                    self.checksum ^= DLE;
                    self.state = DecodeState::InFrame;
                    Ok(None)
                }
                ETX => {
                    self.state = DecodeState::AwaitChecksum;
                    Ok(None)
                }
                other => {
                    self.reset();
                    Err(FrameError::UnexpectedEscape(other))
                }
            },
            DecodeState::AwaitChecksum => {
                let expected = self.checksum;
                if byte != expected {
                    self.reset();
                    return Err(FrameError::ChecksumMismatch {
                        expected,
                        received: byte,
                    });
                }

                let payload = self.buffer.clone();
                self.reset();
                Ok(Some(payload))
            }
        }
    }

    /// Feed multiple bytes to the decoder
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Payload>, FrameError> {
        for &byte in bytes {
            if let Some(payload) = self.feed(byte)? {
                return Ok(Some(payload));
            }
        }
        Ok(None)
    }

    fn append(&mut self, byte: u8) -> Result<(), FrameError> {
        if self.buffer.push(byte).is_err() {
            self.reset();
            return Err(FrameError::Oversize);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checksum(stuffed: &[u8]) -> u8 {
        stuffed.iter().fold(0, |acc, &b| acc ^ b)
    }

    #[test]
    fn test_encode_plain_payload() {
        let mut buffer = [0u8; 16];
        let len = encode(&[0x01, 0x02, 0x03], &mut buffer).unwrap();

        assert_eq!(len, 8);
        assert_eq!(&buffer[..len], &[DLE, STX, 0x01, 0x02, 0x03, DLE, ETX, 0x00]);
    }

    #[test]
    fn test_encode_escapes_dle() {
        let frame = encode_to_vec(&[0xA0, DLE, 0x05]).unwrap();

        assert_eq!(
            frame.as_slice(),
            &[DLE, STX, 0xA0, DLE, DLE, 0x05, DLE, ETX, 0xA0 ^ 0x05]
        );
        assert_eq!(frame.len(), encoded_len(&[0xA0, DLE, 0x05]));
    }

    #[test]
    fn test_checksum_covers_stuffed_region() {
        let frame = encode_to_vec(&[DLE, 0x7F]).unwrap();
        let stuffed = &frame[2..frame.len() - 3];

        assert_eq!(stuffed, &[DLE, DLE, 0x7F]);
        assert_eq!(frame[frame.len() - 1], checksum(stuffed));
    }

    #[test]
    fn test_encode_empty_payload() {
        let frame = encode_to_vec(&[]).unwrap();
        assert_eq!(frame.as_slice(), &[DLE, STX, DLE, ETX, 0x00]);

        let mut decoder = FrameDecoder::new();
        let payload = decoder.feed_bytes(&frame).unwrap().unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let mut buffer = [0u8; 6];
        assert_eq!(
            encode(&[1, 2, 3], &mut buffer),
            Err(FrameError::BufferTooSmall)
        );
    }

    #[test]
    fn test_encode_payload_too_large() {
        let payload = [0u8; MAX_PAYLOAD_SIZE + 1];
        assert_eq!(encode_to_vec(&payload), Err(FrameError::PayloadTooLarge));
    }

    #[test]
    fn test_frame_roundtrip() {
        let original = [0x10, 0x02, 0x03, 0x10, 0x10, 0xFF, 0x00, 0x10];
        let encoded = encode_to_vec(&original).unwrap();

        let mut decoder = FrameDecoder::new();
        let decoded = decoder.feed_bytes(&encoded).unwrap().unwrap();

        assert_eq!(decoded.as_slice(), &original);
        assert_eq!(decoder.state(), DecodeState::Idle);
    }

    #[test]
    fn test_decoder_invalid_checksum() {
        let mut encoded = encode_to_vec(&[0x01, 0x02]).unwrap();
        let last_idx = encoded.len() - 1;
        encoded[last_idx] ^= 0xFF;

        let mut decoder = FrameDecoder::new();
        let result = decoder.feed_bytes(&encoded);
        assert_eq!(
            result,
            Err(FrameError::ChecksumMismatch {
                expected: 0x03,
                received: 0x03 ^ 0xFF
            })
        );
        assert_eq!(decoder.state(), DecodeState::Idle);
    }

    #[test]
    fn test_decoder_unexpected_escape() {
        let mut decoder = FrameDecoder::new();
        let result = decoder.feed_bytes(&[DLE, STX, 0x01, DLE, 0x42]);

        assert_eq!(result, Err(FrameError::UnexpectedEscape(0x42)));
        assert_eq!(decoder.state(), DecodeState::Idle);
    }

    #[test]
    fn test_decoder_resync_after_garbage() {
        let encoded = encode_to_vec(&[0x24]).unwrap();

        let mut data = Vec::<u8, 32>::new();
        data.extend_from_slice(&[0x00, 0xFF, STX, ETX, DLE, 0x55]).unwrap();
        data.extend_from_slice(&encoded).unwrap();

        let mut decoder = FrameDecoder::new();
        let payload = decoder.feed_bytes(&data).unwrap().unwrap();

        assert_eq!(payload.as_slice(), &[0x24]);
    }

    #[test]
    fn test_decoder_repeated_dle_before_stx() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.feed(DLE), Ok(None));
        assert_eq!(decoder.feed(DLE), Ok(None));
        assert_eq!(decoder.state(), DecodeState::AwaitStx);
        assert_eq!(decoder.feed(STX), Ok(None));
        assert_eq!(decoder.state(), DecodeState::InFrame);
    }

    #[test]
    fn test_decoder_state_survives_split_input() {
        let encoded = encode_to_vec(&[0x11, DLE, 0x22]).unwrap();
        let (head, tail) = encoded.split_at(4);

        let mut decoder = FrameDecoder::new();
        assert_eq!(decoder.feed_bytes(head), Ok(None));
        let payload = decoder.feed_bytes(tail).unwrap().unwrap();

        assert_eq!(payload.as_slice(), &[0x11, DLE, 0x22]);
    }

    #[test]
    fn test_decoder_accepts_max_payload() {
        let payload = [0x55u8; MAX_PAYLOAD_SIZE];
        let encoded = encode_to_vec(&payload).unwrap();

        let mut decoder = FrameDecoder::new();
        let decoded = decoder.feed_bytes(&encoded).unwrap().unwrap();
        assert_eq!(decoded.len(), MAX_PAYLOAD_SIZE);
    }

    #[test]
    fn test_decoder_discards_oversize() {
        let mut decoder = FrameDecoder::new();
        decoder.feed_bytes(&[DLE, STX]).unwrap();
        for _ in 0..MAX_PAYLOAD_SIZE {
            assert_eq!(decoder.feed(0x55), Ok(None));
        }

        assert_eq!(decoder.feed(0x55), Err(FrameError::Oversize));
        assert_eq!(decoder.state(), DecodeState::Idle);

        // The tail of the discarded frame is ignored, the next frame decodes
        let next = encode_to_vec(&[0x01]).unwrap();
        assert_eq!(decoder.feed_bytes(&[0x55, DLE, ETX, 0x00]), Ok(None));
        let payload = decoder.feed_bytes(&next).unwrap().unwrap();
        assert_eq!(payload.as_slice(), &[0x01]);
    }

    #[test]
    fn test_decoder_discards_oversize_escaped_dle() {
        let mut decoder = FrameDecoder::new();
        decoder.feed_bytes(&[DLE, STX]).unwrap();
        for _ in 0..MAX_PAYLOAD_SIZE {
            decoder.feed(0x01).unwrap();
        }

        assert_eq!(decoder.feed(DLE), Ok(None));
        assert_eq!(decoder.feed(DLE), Err(FrameError::Oversize));
    }

    #[test]
    fn test_back_to_back_frames() {
        let first = encode_to_vec(&[0x01]).unwrap();
        let second = encode_to_vec(&[0x02]).unwrap();

        let mut decoder = FrameDecoder::new();
        let mut seen = Vec::<u8, 4>::new();
        for &byte in first.iter().chain(second.iter()) {
            if let Some(payload) = decoder.feed(byte).unwrap() {
                seen.push(payload[0]).unwrap();
            }
        }

        assert_eq!(seen.as_slice(), &[0x01, 0x02]);
    }
}
