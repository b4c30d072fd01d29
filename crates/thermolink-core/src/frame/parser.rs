use super::error::DecodeError;
use super::layout;
use super::reader::FrameReader;

use crate::{DecodedRecord, FrameAttributes, TemperatureSample};

/// Decode one hex frame against its envelope attributes.
///
/// Pure and stateless; every call owns the record it produces. Fails with
/// [`DecodeError::UnsupportedMode`] for unknown mode fields and
/// [`DecodeError::MalformedFrame`] for undersized or non-hex input.
pub fn decode_frame(raw: &str, attrs: &FrameAttributes) -> Result<DecodedRecord, DecodeError> {
    let reader = FrameReader::new(raw);
    reader.require_len(layout::MODE_RANGE.end)?;

    match reader.read_mode()? {
        layout::MODE_CURRENT => decode_current(&reader, attrs),
        layout::MODE_HISTORY => decode_history(&reader, attrs),
        layout::MODE_AGGREGATE => decode_aggregate(&reader, attrs),
        layout::MODE_ALARM => decode_alarm(&reader),
        layout::MODE_SYSTEM => decode_system(&reader),
        other => Err(DecodeError::UnsupportedMode {
            mode: other.to_string(),
        }),
    }
}

fn decode_current(
    reader: &FrameReader<'_>,
    attrs: &FrameAttributes,
) -> Result<DecodedRecord, DecodeError> {
    reader.require_len(layout::CURRENT_MIN_LEN)?;
    let samples = vec![
        sample(reader, attrs, layout::CURRENT_T0_RANGE, 0)?,
        sample(reader, attrs, layout::CURRENT_T20_RANGE, layout::T20_OFFSET_S)?,
        sample(reader, attrs, layout::CURRENT_T40_RANGE, layout::T40_OFFSET_S)?,
    ];
    Ok(DecodedRecord::TemperatureBatch { samples })
}

fn decode_history(
    reader: &FrameReader<'_>,
    attrs: &FrameAttributes,
) -> Result<DecodedRecord, DecodeError> {
    reader.require_len(layout::HISTORY_MIN_LEN)?;
    // The device splits the T-60m reading across the frame pair: its low
    // byte rides at the tail of the preceding current frame. Reassembly
    // needs state from that frame and the decoder is stateless, so the
    // T-60m sample is not emitted.
    // TODO: carry the current frame's trailing byte to recover T-60m.
    let samples = vec![
        sample(reader, attrs, layout::HISTORY_T80_RANGE, layout::T80_OFFSET_S)?,
        sample(
            reader,
            attrs,
            layout::HISTORY_T100_RANGE,
            layout::T100_OFFSET_S,
        )?,
    ];
    Ok(DecodedRecord::TemperatureBatch { samples })
}

fn decode_aggregate(
    reader: &FrameReader<'_>,
    attrs: &FrameAttributes,
) -> Result<DecodedRecord, DecodeError> {
    reader.require_len(layout::AGGREGATE_MIN_LEN)?;
    Ok(DecodedRecord::AggregateBatch {
        mean: sample(reader, attrs, layout::AGGREGATE_MEAN_RANGE, 0)?,
        max: sample(reader, attrs, layout::AGGREGATE_MAX_RANGE, 0)?,
        min: sample(reader, attrs, layout::AGGREGATE_MIN_RANGE, 0)?,
    })
}

fn decode_alarm(reader: &FrameReader<'_>) -> Result<DecodedRecord, DecodeError> {
    reader.require_len(layout::ALARM_MIN_LEN)?;
    // Deployed devices emit '0' for off; any flag other than '1' reads as
    // inactive rather than malformed.
    let flag = reader.read_char(layout::ALARM_FLAG_OFFSET)?;
    Ok(DecodedRecord::AlarmEvent { active: flag == '1' })
}

fn decode_system(reader: &FrameReader<'_>) -> Result<DecodedRecord, DecodeError> {
    reader.require_len(layout::SYSTEM_MIN_LEN)?;
    let raw = reader.read_u8(layout::BATTERY_RANGE)?;
    Ok(DecodedRecord::SystemStatus {
        battery_voltage: f64::from(raw) / 10.0,
    })
}

fn sample(
    reader: &FrameReader<'_>,
    attrs: &FrameAttributes,
    range: std::ops::Range<usize>,
    offset_s: i64,
) -> Result<TemperatureSample, DecodeError> {
    // Tenths of a degree, unsigned only.
    let raw = reader.read_u16_le(range)?;
    Ok(TemperatureSample {
        timestamp: attrs.reference_time - offset_s,
        device_id: attrs.device_id.clone(),
        temperature: f64::from(raw) / 10.0,
    })
}
