//! Remote AT Command encoding.
//!
//! Outbound frames carry a Remote AT Command Request that reconfigures one
//! digital output line on the remote radio.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::protocol::frame;
use crate::types::{DigitalLine, PeerAddress};

/// API frame types handled by this monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameType {
    /// Outbound Remote AT Command Request.
    RemoteAtCommand = 0x17,
    /// Inbound IO Data Sample RX Indicator.
    IoDataSample = 0x92,
}

impl FrameType {
    /// Attempts to parse a frame type from a byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x17 => Some(Self::RemoteAtCommand),
            0x92 => Some(Self::IoDataSample),
            _ => None,
        }
    }
}

impl From<FrameType> for u8 {
    fn from(frame_type: FrameType) -> Self {
        frame_type as Self
    }
}

/// Frame id zero suppresses the command acknowledgment.
const NO_ACK_FRAME_ID: u8 = 0x00;

/// Command option requesting the remote radio apply changes immediately.
const APPLY_CHANGES: u8 = 0x02;

/// `D<n>` parameter value driving the pin as a digital output, low.
const DIGITAL_OUT_LOW: u8 = 0x04;

/// `D<n>` parameter value driving the pin as a digital output, high.
const DIGITAL_OUT_HIGH: u8 = 0x05;

/// Encodes a Remote AT Command Request frame that drives one output line.
///
/// The request sets the line's `D<n>` parameter to digital-output-high or
/// digital-output-low with the apply-changes option, producing the fixed
/// 20-byte frame:
/// ```text
/// [0x7E] [len:2BE=16] [0x17] [frame_id=0] [dest_serial:8] [dest_network:2]
/// [0x02] ['D'] [digit] [0x05|0x04] [checksum]
/// ```
///
/// # Errors
///
/// Returns `Error::NotAnOutput` for lines the board wires as inputs.
pub fn encode_set_line(dest: &PeerAddress, line: DigitalLine, high: bool) -> Result<Bytes> {
    let digit = line.at_digit().ok_or(Error::NotAnOutput { line })?;

    let mut payload = BytesMut::with_capacity(16);
    payload.put_u8(FrameType::RemoteAtCommand.into());
    payload.put_u8(NO_ACK_FRAME_ID);
    payload.put_slice(dest.serial());
    payload.put_slice(dest.network());
    payload.put_u8(APPLY_CHANGES);
    payload.put_u8(b'D');
    payload.put_u8(digit);
    payload.put_u8(if high { DIGITAL_OUT_HIGH } else { DIGITAL_OUT_LOW });

    Ok(frame::encode(&payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::checksum;

    fn peer() -> PeerAddress {
        PeerAddress::new([0, 1, 2, 3, 4, 5, 6, 7], [0x00, 0x01])
    }

    #[test]
    fn test_frame_type_values() {
        assert_eq!(u8::from(FrameType::RemoteAtCommand), 0x17);
        assert_eq!(u8::from(FrameType::IoDataSample), 0x92);
        assert_eq!(FrameType::from_byte(0x92), Some(FrameType::IoDataSample));
        assert_eq!(FrameType::from_byte(0x00), None);
    }

    #[test]
    fn test_set_led1_high_exact_bytes() {
        let frame = encode_set_line(&peer(), DigitalLine::Led1, true).unwrap();

        assert_eq!(frame.len(), 20);
        assert_eq!(
            &frame[..19],
            &[
                0x7E, 0x00, 0x10, // delimiter, length 16
                0x17, 0x00, // frame type, no-ack frame id
                0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, // dest serial
                0x00, 0x01, // dest network
                0x02, // apply changes
                0x44, 0x34, // "D4"
                0x05, // drive high
            ]
        );
        assert_eq!(frame[19], checksum::compute(&frame[3..19]));
        assert_eq!(frame[19], 0x4C);
    }

    #[test]
    fn test_set_line_low() {
        let frame = encode_set_line(&peer(), DigitalLine::Led2, false).unwrap();
        assert_eq!(&frame[16..19], &[0x44, 0x35, 0x04]); // "D5", drive low
    }

    #[test]
    fn test_each_led_selects_its_digit() {
        let digits: [(DigitalLine, u8); 4] = [
            (DigitalLine::Led1, 0x34),
            (DigitalLine::Led2, 0x35),
            (DigitalLine::Led3, 0x36),
            (DigitalLine::Led4, 0x37),
        ];
        for (line, digit) in digits {
            let frame = encode_set_line(&peer(), line, true).unwrap();
            assert_eq!(frame[17], digit);
        }
    }

    #[test]
    fn test_input_lines_rejected() {
        for line in [DigitalLine::Switch3, DigitalLine::Switch4, DigitalLine::Button1] {
            assert!(matches!(
                encode_set_line(&peer(), line, true),
                Err(Error::NotAnOutput { .. })
            ));
        }
    }
}
