//! The protocol engine and the high-level [`ZigbeeMonitor`] client.
//!
//! [`Monitor`] is the single-owner protocol core: it holds the deframer,
//! the latest device snapshot, the learned peer address and the outgoing
//! mailbox, with no interior locking. [`ZigbeeMonitor`] wires a core to a
//! transport, running the read and write loops as background tasks.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::event::{Event, EventDispatcher, Subscription};
use crate::protocol::{Deframer, encode_set_line, parse_io_sample};
use crate::transport::{SerialTransport, Transport, serial::SerialConfig};
use crate::types::{DeviceState, DigitalLine, PeerAddress};

/// Fallback poll interval for the write loop.
///
/// The loop is normally woken by an enqueue; the tick bounds how long a
/// missed wakeup or a disconnect can go unnoticed.
pub const WRITE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Single-slot holder for the next frame to transmit.
///
/// A new enqueue overwrites an unsent frame: commands are not queued, so
/// a burst of toggle requests collapses to the most recent one.
#[derive(Debug, Default)]
struct OutgoingMailbox {
    pending: Option<Bytes>,
}

impl OutgoingMailbox {
    fn put(&mut self, frame: Bytes) {
        self.pending = Some(frame);
    }

    fn take(&mut self) -> Option<Bytes> {
        self.pending.take()
    }
}

/// The protocol engine: deframer state, device snapshot, learned peer
/// address and the outgoing mailbox.
///
/// All mutation goes through `&mut self`, so one lock around the monitor
/// serializes the read loop, the write loop and command-issuing callers.
#[derive(Debug, Default)]
pub struct Monitor {
    deframer: Deframer,
    device_state: DeviceState,
    peer: Option<PeerAddress>,
    mailbox: OutgoingMailbox,
}

impl Monitor {
    /// Creates a monitor with no learned peer and an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the latest device snapshot.
    #[must_use]
    pub const fn device_state(&self) -> &DeviceState {
        &self.device_state
    }

    /// Returns the peer learned from the most recent IO sample, if any.
    #[must_use]
    pub const fn peer(&self) -> Option<&PeerAddress> {
        self.peer.as_ref()
    }

    /// Pushes received bytes through the deframer and payload decoder.
    ///
    /// Returns the events produced: one [`Event::DeviceState`] per decoded
    /// IO sample and one [`Event::ProtocolError`] per recoverable decode
    /// failure. Frames with unrecognized types are accepted and ignored.
    /// An error never stops processing of the remaining bytes.
    pub fn feed(&mut self, data: &[u8]) -> Vec<Event> {
        let mut events = Vec::new();

        for &byte in data {
            let Some(result) = self.deframer.push(byte) else {
                continue;
            };

            match result {
                Ok(frame) => match parse_io_sample(frame.payload()) {
                    Ok(Some(sample)) => {
                        tracing::debug!("IO sample from {}", sample.source);
                        self.device_state = sample.state;
                        self.peer = Some(sample.source);
                        events.push(Event::DeviceState(Box::new(self.device_state.clone())));
                    }
                    Ok(None) => {
                        tracing::trace!(
                            "ignoring frame type 0x{:02x}",
                            frame.payload().first().copied().unwrap_or_default()
                        );
                    }
                    Err(e) => {
                        tracing::warn!("dropping IO sample: {e}");
                        events.push(Event::ProtocolError(e));
                    }
                },
                Err(e) => {
                    tracing::warn!("frame error: {e}");
                    events.push(Event::ProtocolError(e));
                }
            }
        }

        events
    }

    /// Queues a command that drives one output line on the learned peer.
    ///
    /// The new frame replaces any unsent pending one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoPeerKnown`] before the first IO sample has
    /// arrived, and [`Error::NotAnOutput`] for input-only lines. Nothing
    /// is queued in either case.
    pub fn enqueue_command(&mut self, line: DigitalLine, high: bool) -> Result<()> {
        let peer = self.peer.as_ref().ok_or(Error::NoPeerKnown)?;
        let frame = encode_set_line(peer, line, high)?;
        self.mailbox.put(frame);
        Ok(())
    }

    /// Takes the pending outgoing frame, leaving the mailbox empty.
    pub fn drain_outgoing(&mut self) -> Option<Bytes> {
        self.mailbox.take()
    }

    /// Returns true while a frame is partially assembled.
    #[must_use]
    pub fn mid_frame(&self) -> bool {
        self.deframer.mid_frame()
    }

    /// Abandons a partially assembled frame after an inter-byte stall.
    ///
    /// Returns true if an assembly was actually abandoned.
    pub fn reset_assembly(&mut self) -> bool {
        if self.deframer.mid_frame() {
            self.deframer.reset();
            true
        } else {
            false
        }
    }
}

/// Client that monitors a ZigBee IO expansion board over a transport.
pub struct ZigbeeMonitor<T> {
    transport: Arc<Mutex<T>>,
    monitor: Arc<Mutex<Monitor>>,
    dispatcher: EventDispatcher,
    outgoing: Arc<Notify>,
    read_task: Option<JoinHandle<()>>,
    write_task: Option<JoinHandle<()>>,
}

impl ZigbeeMonitor<SerialTransport> {
    /// Creates a new client for a serial port.
    ///
    /// # Arguments
    ///
    /// * `port` - Serial port path (e.g., "/dev/ttyUSB0" or "COM3")
    ///
    /// # Returns
    ///
    /// A new client (not yet connected).
    #[must_use]
    pub fn serial(port: impl Into<String>) -> Self {
        Self::with_serial_config(SerialConfig::new(port))
    }

    /// Creates a new client with custom serial configuration.
    #[must_use]
    pub fn with_serial_config(config: SerialConfig) -> Self {
        Self::new(SerialTransport::new(config))
    }
}

impl<T: Transport + 'static> ZigbeeMonitor<T> {
    /// Creates a new client with the given transport.
    fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(Mutex::new(transport)),
            monitor: Arc::new(Mutex::new(Monitor::new())),
            dispatcher: EventDispatcher::new(256),
            outgoing: Arc::new(Notify::new()),
            read_task: None,
            write_task: None,
        }
    }

    /// Connects the transport and starts the read and write loops.
    ///
    /// # Errors
    ///
    /// Returns an error if opening the transport fails.
    pub async fn connect(&mut self) -> Result<()> {
        {
            let mut transport = self.transport.lock().await;
            transport.connect().await?;
        }

        self.start_read_loop().await;
        self.start_write_loop();

        self.dispatcher.dispatch(Event::Connected);
        Ok(())
    }

    /// Starts the background read loop.
    async fn start_read_loop(&mut self) {
        // Take the reader half out of the transport (serial only).
        let reader_and_timeout = {
            let mut transport = self.transport.lock().await;
            if let Some(serial) =
                ((&mut *transport) as &mut dyn std::any::Any).downcast_mut::<SerialTransport>()
            {
                let idle_timeout = serial.config().idle_timeout;
                serial.take_reader().map(|r| (r, idle_timeout))
            } else {
                None
            }
        };

        if let Some((reader, idle_timeout)) = reader_and_timeout {
            let monitor = Arc::clone(&self.monitor);
            let dispatcher = self.dispatcher.clone();
            let read_task = tokio::spawn(async move {
                if let Err(e) = SerialTransport::run_read_loop_with_reader(
                    reader,
                    monitor,
                    dispatcher.clone(),
                    idle_timeout,
                )
                .await
                {
                    tracing::error!("read loop error: {e}");
                }
                dispatcher.dispatch(Event::Disconnected);
            });
            self.read_task = Some(read_task);
        }
    }

    /// Starts the background write loop.
    ///
    /// The loop blocks on the mailbox notification and drains at most one
    /// frame per wakeup; the fallback tick keeps it responsive if a
    /// notification is missed.
    fn start_write_loop(&mut self) {
        let transport = Arc::clone(&self.transport);
        let monitor = Arc::clone(&self.monitor);
        let outgoing = Arc::clone(&self.outgoing);
        let dispatcher = self.dispatcher.clone();

        let write_task = tokio::spawn(async move {
            loop {
                let _ = tokio::time::timeout(WRITE_POLL_INTERVAL, outgoing.notified()).await;

                let frame = {
                    let mut monitor = monitor.lock().await;
                    monitor.drain_outgoing()
                };

                if let Some(frame) = frame {
                    tracing::trace!("sending frame: {} bytes", frame.len());
                    let mut transport = transport.lock().await;
                    if let Err(e) = transport.send(frame).await {
                        tracing::error!("write loop error: {e}");
                        dispatcher.dispatch(Event::Disconnected);
                        return;
                    }
                }
            }
        });
        self.write_task = Some(write_task);
    }

    /// Disconnects from the device.
    ///
    /// Both loops stop immediately; any unsent pending frame is dropped.
    pub async fn disconnect(&mut self) -> Result<()> {
        if let Some(task) = self.read_task.take() {
            task.abort();
        }
        if let Some(task) = self.write_task.take() {
            task.abort();
        }

        {
            let mut transport = self.transport.lock().await;
            transport.disconnect().await?;
        }

        self.dispatcher.dispatch(Event::Disconnected);
        Ok(())
    }

    /// Returns true if connected.
    pub async fn is_connected(&self) -> bool {
        let transport = self.transport.lock().await;
        transport.is_connected()
    }

    /// Returns a copy of the latest device snapshot.
    pub async fn device_state(&self) -> DeviceState {
        self.monitor.lock().await.device_state().clone()
    }

    /// Returns the learned peer address, if any.
    pub async fn peer(&self) -> Option<PeerAddress> {
        self.monitor.lock().await.peer().copied()
    }

    /// Queues a command driving one output line and wakes the write loop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoPeerKnown`] before the first IO sample has
    /// arrived, and [`Error::NotAnOutput`] for input-only lines.
    pub async fn set_line(&self, line: DigitalLine, high: bool) -> Result<()> {
        {
            let mut monitor = self.monitor.lock().await;
            monitor.enqueue_command(line, high)?;
        }
        self.outgoing.notify_one();
        Ok(())
    }

    /// Subscribes to device-state and protocol-error events.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        self.dispatcher.subscribe()
    }
}

impl<T> Drop for ZigbeeMonitor<T> {
    fn drop(&mut self) {
        if let Some(task) = self.read_task.take() {
            task.abort();
        }
        if let Some(task) = self.write_task.take() {
            task.abort();
        }
    }
}
