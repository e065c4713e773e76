//! Payload decoding for IO Data Sample frames.

use crate::error::FrameError;
use crate::protocol::command::FrameType;
use crate::types::{ANALOG_CHANNELS, DeviceState, DigitalLine, LineLevel, PeerAddress};

/// Fixed payload offsets within an IO Data Sample frame.
const OFFSET_SOURCE_SERIAL: usize = 1;
const OFFSET_SOURCE_NETWORK: usize = 9;
const OFFSET_DIGITAL_MASK: usize = 13;
const OFFSET_ANALOG_MASK: usize = 15;

/// Length of the fixed header before any sample data.
const FIXED_HEADER_LEN: usize = 16;

/// Analog mask bit reporting the supply voltage. Carried by the radio but
/// the board has no Vcc display, so it yields no reading.
pub const ANALOG_VCC_BIT: u8 = 0x80;

/// A decoded IO Data Sample: the new device snapshot plus its sender.
#[derive(Debug, Clone, PartialEq)]
pub struct IoSample {
    /// The full device snapshot carried by the sample.
    pub state: DeviceState,
    /// Source address fields, the new default command destination.
    pub source: PeerAddress,
}

fn ensure_len(payload: &[u8], needed: usize) -> Result<(), FrameError> {
    if payload.len() < needed {
        return Err(FrameError::Truncated {
            needed,
            got: payload.len(),
        });
    }
    Ok(())
}

fn read_u16_be(payload: &[u8], offset: usize) -> Result<u16, FrameError> {
    ensure_len(payload, offset + 2)?;
    Ok(u16::from_be_bytes([payload[offset], payload[offset + 1]]))
}

/// Decodes an IO Data Sample payload.
///
/// Payload layout (multi-byte fields big-endian):
/// ```text
/// [tag:1] [source_serial:8] [source_network:2] [options:1] [sample_sets:1]
/// [digital_mask:2BE] [analog_mask:1]
/// (if digital_mask != 0: [digital_samples:2BE])
/// then one [sample:2BE] per set analog mask bit, AD0..AD3 ascending
/// ```
/// Channels with unset mask bits contribute no bytes, so later fields
/// shift accordingly.
///
/// Returns `Ok(None)` for any other leading tag: unrecognized frame types
/// are ignored, not rejected.
///
/// # Errors
///
/// Returns `FrameError::Truncated` if the payload ends before a field its
/// masks promise.
pub fn parse_io_sample(payload: &[u8]) -> Result<Option<IoSample>, FrameError> {
    match payload.first() {
        Some(&tag) if tag == u8::from(FrameType::IoDataSample) => {}
        _ => return Ok(None),
    }
    ensure_len(payload, FIXED_HEADER_LEN)?;

    let mut serial = [0u8; 8];
    serial.copy_from_slice(&payload[OFFSET_SOURCE_SERIAL..OFFSET_SOURCE_SERIAL + 8]);
    let mut network = [0u8; 2];
    network.copy_from_slice(&payload[OFFSET_SOURCE_NETWORK..OFFSET_SOURCE_NETWORK + 2]);

    // Options and sample-set count sit at offsets 11 and 12; nothing
    // downstream consumes them.
    let digital_mask = read_u16_be(payload, OFFSET_DIGITAL_MASK)?;
    let analog_mask = payload[OFFSET_ANALOG_MASK];

    let mut offset = FIXED_HEADER_LEN;

    // The digital sample word is present only when at least one digital
    // channel is enabled.
    let digital_samples = if digital_mask == 0 {
        0
    } else {
        let samples = read_u16_be(payload, offset)?;
        offset += 2;
        samples
    };

    let mut state = DeviceState::default();
    for line in DigitalLine::ALL {
        *state.line_mut(line) =
            LineLevel::from_sample(digital_samples, digital_mask, line.mask_bit());
    }

    for channel in 0..ANALOG_CHANNELS {
        if analog_mask & (1 << channel) != 0 {
            state.analog[channel] = Some(read_u16_be(payload, offset)?);
            offset += 2;
        }
    }

    Ok(Some(IoSample {
        state,
        source: PeerAddress::new(serial, network),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERIAL: [u8; 8] = [0x00, 0x13, 0xA2, 0x00, 0x40, 0x0A, 0x01, 0x27];
    const NETWORK: [u8; 2] = [0x7D, 0x84];

    /// Builds an IO sample payload with the given masks and sample words.
    fn sample_payload(
        digital_mask: u16,
        digital_samples: u16,
        analog: [Option<u16>; ANALOG_CHANNELS],
    ) -> Vec<u8> {
        let mut analog_mask = 0u8;
        for (channel, sample) in analog.iter().enumerate() {
            if sample.is_some() {
                analog_mask |= 1 << channel;
            }
        }

        let mut payload = vec![0x92];
        payload.extend_from_slice(&SERIAL);
        payload.extend_from_slice(&NETWORK);
        payload.push(0x01); // options: packet acknowledged
        payload.push(0x01); // one sample set
        payload.extend_from_slice(&digital_mask.to_be_bytes());
        payload.push(analog_mask);
        if digital_mask != 0 {
            payload.extend_from_slice(&digital_samples.to_be_bytes());
        }
        for sample in analog.into_iter().flatten() {
            payload.extend_from_slice(&sample.to_be_bytes());
        }
        payload
    }

    #[test]
    fn test_unrecognized_tag_is_ignored() {
        assert_eq!(parse_io_sample(&[0xAA, 0xBB]), Ok(None));
        assert_eq!(parse_io_sample(&[]), Ok(None));
    }

    #[test]
    fn test_empty_masks_report_nothing() {
        let payload = sample_payload(0, 0, [None; ANALOG_CHANNELS]);
        let sample = parse_io_sample(&payload).unwrap().unwrap();

        for line in DigitalLine::ALL {
            assert_eq!(sample.state.line(line), LineLevel::NotReported);
        }
        assert_eq!(sample.state.analog, [None; ANALOG_CHANNELS]);
        // Exactly the fixed header; no sample bytes follow.
        assert_eq!(payload.len(), 16);
    }

    #[test]
    fn test_digital_lines_decoded() {
        let mask = DigitalLine::Led1.mask_bit()
            | DigitalLine::Led3.mask_bit()
            | DigitalLine::Switch3.mask_bit();
        let samples = DigitalLine::Led1.mask_bit() | DigitalLine::Switch3.mask_bit();
        let payload = sample_payload(mask, samples, [None; ANALOG_CHANNELS]);

        let sample = parse_io_sample(&payload).unwrap().unwrap();
        assert_eq!(sample.state.led1, LineLevel::High);
        assert_eq!(sample.state.led3, LineLevel::Low);
        assert_eq!(sample.state.switch3, LineLevel::High);
        assert_eq!(sample.state.led2, LineLevel::NotReported);
        assert_eq!(sample.state.button1, LineLevel::NotReported);
    }

    #[test]
    fn test_masked_but_low_distinct_from_unreported() {
        let mask = DigitalLine::Button1.mask_bit();
        let payload = sample_payload(mask, 0, [None; ANALOG_CHANNELS]);

        let sample = parse_io_sample(&payload).unwrap().unwrap();
        assert_eq!(sample.state.button1, LineLevel::Low);
        assert!(sample.state.button1.is_reported());
        assert!(!sample.state.switch4.is_reported());
    }

    #[test]
    fn test_analog_offsets_shift_with_absent_channels() {
        // Only AD1 and AD3 sampled: AD3 must be read right after AD1.
        let payload = sample_payload(0, 0, [None, Some(0x0123), None, Some(0x0200)]);

        let sample = parse_io_sample(&payload).unwrap().unwrap();
        assert_eq!(sample.state.analog, [None, Some(0x0123), None, Some(0x0200)]);
        assert_eq!(sample.state.temperature().unwrap().celsius, 60.0);
    }

    #[test]
    fn test_digital_and_analog_combined() {
        let mask = DigitalLine::Led2.mask_bit();
        let payload = sample_payload(mask, mask, [Some(600), Some(0), None, None]);

        let sample = parse_io_sample(&payload).unwrap().unwrap();
        assert_eq!(sample.state.led2, LineLevel::High);
        assert_eq!(sample.state.display_level(0), Some(60));
        assert_eq!(sample.state.display_level(1), Some(0));
        assert_eq!(sample.state.display_level(2), None);
    }

    #[test]
    fn test_vcc_bit_yields_no_reading() {
        let mut payload = sample_payload(0, 0, [None; ANALOG_CHANNELS]);
        payload[15] |= ANALOG_VCC_BIT;

        let sample = parse_io_sample(&payload).unwrap().unwrap();
        assert_eq!(sample.state.analog, [None; ANALOG_CHANNELS]);
    }

    #[test]
    fn test_source_address_learned() {
        let payload = sample_payload(0, 0, [None; ANALOG_CHANNELS]);
        let sample = parse_io_sample(&payload).unwrap().unwrap();
        assert_eq!(sample.source, PeerAddress::new(SERIAL, NETWORK));
    }

    #[test]
    fn test_truncated_header() {
        let payload = sample_payload(0, 0, [None; ANALOG_CHANNELS]);
        assert_eq!(
            parse_io_sample(&payload[..12]),
            Err(FrameError::Truncated { needed: 16, got: 12 })
        );
    }

    #[test]
    fn test_truncated_sample_data() {
        let mask = DigitalLine::Led1.mask_bit();
        let mut payload = sample_payload(mask, mask, [None; ANALOG_CHANNELS]);
        payload.truncate(17); // half of the digital sample word

        assert_eq!(
            parse_io_sample(&payload),
            Err(FrameError::Truncated { needed: 18, got: 17 })
        );
    }

    #[test]
    fn test_truncated_analog_sample() {
        let mut payload = sample_payload(0, 0, [Some(100), Some(200), None, None]);
        payload.truncate(payload.len() - 1);

        assert_eq!(
            parse_io_sample(&payload),
            Err(FrameError::Truncated { needed: 20, got: 19 })
        );
    }
}
