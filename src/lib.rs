//! # zigbee-monitor
//!
//! A Rust client library for monitoring ZigBee IO expansion boards over a
//! serial link.
//!
//! The library decodes the radio's binary API frames into device-state
//! snapshots (digital lines, analog channels, a derived temperature) and
//! encodes Remote AT Command frames that drive output lines on the remote
//! radio.
//!
//! ## Features
//!
//! - Async/await based API using Tokio
//! - Resumable deframing that tolerates arbitrary serial chunking
//! - Checksum verification on every inbound frame
//! - Event-driven architecture for device-state updates
//! - Comprehensive error handling
//!
//! ## Quick Start
//!
//! ```no_run
//! use zigbee_monitor::{DigitalLine, Event, ZigbeeMonitor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), zigbee_monitor::Error> {
//!     // Connect to the radio attached to the expansion board
//!     let mut monitor = ZigbeeMonitor::serial("/dev/ttyUSB0");
//!     monitor.connect().await?;
//!
//!     let mut events = monitor.subscribe();
//!     while let Some(event) = events.recv().await {
//!         if let Event::DeviceState(state) = event {
//!             println!("button1: {:?}", state.button1);
//!
//!             // Drive LED1 to follow the push button
//!             monitor
//!                 .set_line(DigitalLine::Led1, state.button1.is_high())
//!                 .await?;
//!         }
//!     }
//!
//!     monitor.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`protocol`] - Low-level protocol types (checksum, frames, payload
//!   decoding, command encoding)
//! - [`types`] - Data structures (device state, peer addresses)
//! - [`transport`] - Transport implementations (currently USB/Serial)
//! - [`event`] - Async event system for observer notifications
//! - [`monitor`] - The protocol engine and high-level [`ZigbeeMonitor`]
//!   client

pub mod error;
pub mod event;
pub mod monitor;
pub mod protocol;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use error::{Error, FrameError, Result};
pub use event::{Event, EventDispatcher, Subscription};
pub use monitor::{Monitor, ZigbeeMonitor};
pub use protocol::{
    Deframer, FRAME_DELIMITER, Frame, FrameType, IoSample, MAX_PAYLOAD_LEN, encode_set_line,
    parse_io_sample,
};
pub use transport::{SerialTransport, serial::list_ports};
pub use types::{DeviceState, DigitalLine, LineLevel, PeerAddress, Temperature};
