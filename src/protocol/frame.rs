//! Frame assembly for the ZigBee serial API protocol.
//!
//! The wire format uses a length-delimited framing protocol (multi-byte
//! fields big-endian):
//! ```text
//! ┌──────────┬──────────────┬─────────────────┬──────────┐
//! │  0x7E    │  length (BE) │    payload      │ checksum │
//! │  1 byte  │   2 bytes    │  length bytes   │  1 byte  │
//! └──────────┴──────────────┴─────────────────┴──────────┘
//! ```
//! Framing is length-prefixed, not byte-stuffed: a `0x7E` inside the
//! length, payload or checksum positions is ordinary data.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::FrameError;
use crate::protocol::checksum;

/// Start-of-frame delimiter byte.
pub const FRAME_DELIMITER: u8 = 0x7E;

/// Maximum frame payload size (the device receive buffer size).
pub const MAX_PAYLOAD_LEN: usize = 64;

/// Encodes a payload into a framed message.
///
/// # Panics
///
/// Panics if the payload exceeds `MAX_PAYLOAD_LEN`.
#[must_use]
pub fn encode(payload: &[u8]) -> Bytes {
    assert!(
        payload.len() <= MAX_PAYLOAD_LEN,
        "payload exceeds maximum frame size"
    );

    let mut buf = BytesMut::with_capacity(payload.len() + 4);
    buf.put_u8(FRAME_DELIMITER);
    buf.put_u16(u16::try_from(payload.len()).expect("length checked above"));
    buf.put_slice(payload);
    buf.put_u8(checksum::compute(payload));
    buf.freeze()
}

/// A complete length-delimited frame with a verified checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    payload: Bytes,
    checksum: u8,
}

impl Frame {
    /// Returns the frame payload.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Returns the payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Returns true if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Returns the verified trailing checksum byte.
    #[must_use]
    pub const fn checksum(&self) -> u8 {
        self.checksum
    }

    /// Consumes the frame, returning its payload.
    #[must_use]
    pub fn into_payload(self) -> Bytes {
        self.payload
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum State {
    #[default]
    Seeking,
    LengthHigh,
    LengthLow,
    Payload,
    Complete,
}

/// Resumable frame assembler.
///
/// Consumes the byte stream one byte at a time and emits complete frames.
/// State persists across calls, so a frame may span any number of serial
/// reads; feeding a stream byte-by-byte or all at once yields identical
/// frames. Bytes outside a frame are discarded until the next delimiter.
#[derive(Debug, Default)]
pub struct Deframer {
    state: State,
    length: usize,
    remaining: usize,
    payload: BytesMut,
}

impl Deframer {
    /// Creates a new deframer, seeking a delimiter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while a frame is partially assembled.
    #[must_use]
    pub fn mid_frame(&self) -> bool {
        self.state != State::Seeking
    }

    /// Abandons any partially assembled frame and reseeks the delimiter.
    pub fn reset(&mut self) {
        self.state = State::Seeking;
        self.length = 0;
        self.remaining = 0;
        self.payload.clear();
    }

    /// Consumes one byte of the stream.
    ///
    /// Returns `Some(Ok(frame))` when the byte completes a valid frame,
    /// `Some(Err(_))` when it invalidates the frame being assembled, and
    /// `None` otherwise. After an error the deframer has already reseeked,
    /// so the caller can keep pushing.
    pub fn push(&mut self, byte: u8) -> Option<Result<Frame, FrameError>> {
        match self.state {
            State::Seeking => {
                if byte == FRAME_DELIMITER {
                    self.state = State::LengthHigh;
                    self.length = 0;
                    self.payload.clear();
                }
                None
            }
            State::LengthHigh => {
                self.length = usize::from(byte) << 8;
                self.state = State::LengthLow;
                None
            }
            State::LengthLow => {
                self.length |= usize::from(byte);
                if self.length > MAX_PAYLOAD_LEN {
                    let len = self.length;
                    self.reset();
                    return Some(Err(FrameError::TooLarge {
                        len,
                        max: MAX_PAYLOAD_LEN,
                    }));
                }
                self.remaining = self.length;
                self.state = if self.remaining == 0 {
                    State::Complete
                } else {
                    State::Payload
                };
                None
            }
            State::Payload => {
                self.payload.put_u8(byte);
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.state = State::Complete;
                }
                None
            }
            State::Complete => {
                let payload = self.payload.split().freeze();
                let expected = checksum::compute(&payload);
                self.reset();

                if expected == byte {
                    Some(Ok(Frame {
                        payload,
                        checksum: byte,
                    }))
                } else {
                    Some(Err(FrameError::InvalidChecksum {
                        expected,
                        got: byte,
                    }))
                }
            }
        }
    }

    /// Feeds a chunk of bytes, collecting the frames and errors it yields.
    pub fn feed(&mut self, data: &[u8]) -> Vec<Result<Frame, FrameError>> {
        data.iter().filter_map(|&b| self.push(b)).collect()
    }
}
