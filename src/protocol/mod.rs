//! Protocol definitions for the ZigBee serial API.
//!
//! This module contains the low-level protocol types including:
//! - Checksum compute/verify
//! - Frame assembly and encoding
//! - IO Data Sample payload decoding
//! - Remote AT Command encoding

pub mod checksum;
pub mod command;
pub mod frame;
pub mod parser;

pub use command::{FrameType, encode_set_line};
pub use frame::{Deframer, FRAME_DELIMITER, Frame, MAX_PAYLOAD_LEN, encode as encode_frame};
pub use parser::{IoSample, parse_io_sample};
