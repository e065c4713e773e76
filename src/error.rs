//! Error types for the zigbee-monitor library.

use thiserror::Error;

use crate::types::DigitalLine;

/// The main error type for monitor operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Serial port error.
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame assembly or decoding error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// A command was requested before any peer address was learned.
    #[error("no peer address learned yet")]
    NoPeerKnown,

    /// The requested line cannot be driven remotely.
    #[error("line {line:?} is not a settable output")]
    NotAnOutput { line: DigitalLine },

    /// Connection is not established.
    #[error("not connected")]
    NotConnected,
}

/// Recoverable protocol-level errors.
///
/// Each of these drops the affected frame and resynchronizes; processing
/// of subsequent bytes continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Trailing checksum did not match the computed one.
    #[error("checksum mismatch: computed 0x{expected:02x}, received 0x{got:02x}")]
    InvalidChecksum { expected: u8, got: u8 },

    /// Declared payload length exceeds the receive buffer.
    #[error("frame too large: {len} bytes exceeds maximum {max}")]
    TooLarge { len: usize, max: usize },

    /// Payload ended before a field it promised.
    #[error("payload truncated: needed {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },

    /// No byte arrived for too long while a frame was mid-assembly.
    #[error("frame assembly stalled mid-frame")]
    Stalled,
}

/// Result type alias for monitor operations.
pub type Result<T> = std::result::Result<T, Error>;
