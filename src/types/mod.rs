//! Data types for the monitored expansion board.
//!
//! This module contains the core data structures used throughout the
//! library:
//! - Peer addressing
//! - Digital line and analog channel state

pub mod address;
pub mod device;

pub use address::{NETWORK_LEN, PeerAddress, SERIAL_LEN};
pub use device::{
    ANALOG_CHANNELS, DeviceState, DigitalLine, LineLevel, TEMPERATURE_CHANNEL, Temperature,
};
