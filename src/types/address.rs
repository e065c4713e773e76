//! Peer addressing.

/// Length of a radio serial number in bytes.
pub const SERIAL_LEN: usize = 8;

/// Length of a network address in bytes.
pub const NETWORK_LEN: usize = 2;

/// The 64-bit serial number and 16-bit network address identifying the
/// remote radio.
///
/// Learned from the source fields of the most recently decoded IO sample
/// and used as the destination for outgoing commands.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerAddress {
    serial: [u8; SERIAL_LEN],
    network: [u8; NETWORK_LEN],
}

impl PeerAddress {
    /// Creates a peer address from its raw serial and network fields.
    #[must_use]
    pub const fn new(serial: [u8; SERIAL_LEN], network: [u8; NETWORK_LEN]) -> Self {
        Self { serial, network }
    }

    /// Returns the 8-byte serial number (big-endian, as on the wire).
    #[must_use]
    pub const fn serial(&self) -> &[u8; SERIAL_LEN] {
        &self.serial
    }

    /// Returns the 2-byte network address.
    #[must_use]
    pub const fn network(&self) -> &[u8; NETWORK_LEN] {
        &self.network
    }
}

impl std::fmt::Debug for PeerAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PeerAddress({}/{})",
            hex::encode(self.serial),
            hex::encode(self.network)
        )
    }
}

impl std::fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}",
            hex::encode(self.serial),
            hex::encode(self.network)
        )
    }
}
