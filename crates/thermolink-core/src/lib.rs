//! Thermolink core library for sensor telemetry ingestion.
//!
//! This crate implements the decode pipeline used by the CLI and the bus
//! republisher: transport envelopes are unpacked into ASCII-hex frames, the
//! frame decoder (layout/reader/parser) interprets them per mode, and the
//! resulting records are handed to the publisher collaborator. Decoding is
//! string-oriented and side-effect free; transport concerns are isolated in
//! `envelope` and `publish`. Wire conventions are captured in the frame
//! reader so the parser stays minimal and consistent with the device
//! protocol.
//!
//! Invariants:
//! - Decoding is pure and stateless: the same (frame, attributes) pair
//!   always yields the same record.
//! - Temperature fields are little-endian 16-bit tenths of a degree,
//!   unsigned only.
//! - A decode produces a complete, validated record or an error, never a
//!   partial result.
//!
//! Version française (résumé):
//! Cette crate fournit le cœur d'ingestion : enveloppe -> décodeur de
//! trames (layout/reader/parser) -> éditeur de records. Le décodage est pur
//! et sans E/S ; le transport reste dans `envelope` et `publish`. Garanties :
//! décodage déterministe, températures 16 bits petit-boutistes en dixièmes
//! de degré, record complet ou erreur.
//!
//! # Examples
//! ```
//! use thermolink_core::{DecodedRecord, FrameAttributes, decode_frame};
//!
//! let attrs = FrameAttributes {
//!     device_id: "1B2DEB".to_string(),
//!     reference_time: 1_533_564_208,
//! };
//! let record = decode_frame("c9020001", &attrs)?;
//! assert_eq!(record, DecodedRecord::AlarmEvent { active: true });
//! # Ok::<(), thermolink_core::DecodeError>(())
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod envelope;
pub mod frame;
pub mod publish;

pub use envelope::{Envelope, EnvelopeAttributes, EnvelopeError, FrameEvent, unpack};
pub use frame::decode_frame;
pub use frame::error::DecodeError;
pub use publish::{BusError, MemoryBus, MessageBus, PublishError, RecordPublisher};

/// Default topic decoded records are queued on.
pub const DEFAULT_TOPIC: &str = "timeseries";

/// One decoded temperature reading.
///
/// # Examples
/// ```
/// use thermolink_core::TemperatureSample;
///
/// let sample = TemperatureSample {
///     timestamp: 1_533_564_208,
///     device_id: "1B2DEB".to_string(),
///     temperature: 19.1,
/// };
/// assert_eq!(sample.temperature, 19.1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSample {
    /// Seconds since epoch, shifted per the frame layout.
    pub timestamp: i64,
    /// Device identifier from the envelope attributes.
    pub device_id: String,
    /// Degrees with one implicit decimal place.
    pub temperature: f64,
}

/// Attribute pair accompanying one raw frame.
///
/// # Examples
/// ```
/// use thermolink_core::FrameAttributes;
///
/// let attrs = FrameAttributes {
///     device_id: "1B2DEB".to_string(),
///     reference_time: 1_533_564_208,
/// };
/// assert_eq!(attrs.reference_time, 1_533_564_208);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAttributes {
    /// Device identifier string.
    pub device_id: String,
    /// Envelope timestamp anchoring historical sample offsets.
    pub reference_time: i64,
}

/// Decoded result of one frame, keyed by frame kind.
///
/// # Examples
/// ```
/// use thermolink_core::DecodedRecord;
///
/// let record = DecodedRecord::AlarmEvent { active: true };
/// let json = serde_json::to_value(&record).expect("record json");
/// assert_eq!(json["kind"], "alarm_event");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodedRecord {
    /// Timestamped readings, newest first.
    TemperatureBatch { samples: Vec<TemperatureSample> },
    /// Aggregate statistics, all stamped with the reference time.
    AggregateBatch {
        mean: TemperatureSample,
        max: TemperatureSample,
        min: TemperatureSample,
    },
    /// Alarm toggle.
    AlarmEvent { active: bool },
    /// Battery status; volts with one decimal place.
    SystemStatus { battery_voltage: f64 },
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("envelope error: {0}")]
    Envelope(#[from] EnvelopeError),
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("publish error: {0}")]
    Publish(#[from] PublishError),
}

/// Unpack and decode one envelope without publishing.
///
/// # Examples
/// ```
/// use thermolink_core::{DecodedRecord, Envelope, decode_envelope};
///
/// let envelope: Envelope = serde_json::from_str(
///     r#"{"data":"YzkwMjAwMDE=","attributes":{"device":"1B2DEB","time":"1533564208"}}"#,
/// )
/// .expect("envelope json");
/// let record = decode_envelope(&envelope)?;
/// assert_eq!(record, DecodedRecord::AlarmEvent { active: true });
/// # Ok::<(), thermolink_core::IngestError>(())
/// ```
pub fn decode_envelope(envelope: &Envelope) -> Result<DecodedRecord, IngestError> {
    let event = envelope::unpack(envelope)?;
    debug!(
        device = %event.attrs.device_id,
        time = event.attrs.reference_time,
        frame = %event.raw,
        "decoding frame"
    );
    Ok(frame::decode_frame(&event.raw, &event.attrs)?)
}

/// Unpack, decode, and publish one envelope.
pub fn process_envelope<B: MessageBus>(
    envelope: &Envelope,
    publisher: &mut RecordPublisher<B>,
) -> Result<DecodedRecord, IngestError> {
    let record = decode_envelope(envelope)?;
    publisher.publish_record(&record)?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alarm_envelope() -> Envelope {
        serde_json::from_str(
            r#"{"data":"YzkwMjAwMDE=","attributes":{"device":"1B2DEB","time":"1533564208"}}"#,
        )
        .expect("envelope json")
    }

    #[test]
    fn process_envelope_publishes_decoded_record() {
        let mut publisher = RecordPublisher::new(MemoryBus::new(), DEFAULT_TOPIC);
        let record = process_envelope(&alarm_envelope(), &mut publisher).unwrap();
        assert_eq!(record, DecodedRecord::AlarmEvent { active: true });

        let messages = publisher.bus().messages(DEFAULT_TOPIC);
        assert_eq!(messages.len(), 1);
        let value: serde_json::Value = serde_json::from_slice(&messages[0]).unwrap();
        assert_eq!(value["kind"], "alarm_event");
        assert_eq!(value["active"], true);
    }

    #[test]
    fn decode_envelope_reports_decode_failures() {
        let mut envelope = alarm_envelope();
        // base64 of "c9ff0001"
        envelope.data = "YzlmZjAwMDE=".to_string();
        let err = decode_envelope(&envelope).unwrap_err();
        assert!(matches!(err, IngestError::Decode(_)));
    }

    #[test]
    fn temperature_batch_serializes_sample_fields() {
        let record = DecodedRecord::TemperatureBatch {
            samples: vec![TemperatureSample {
                timestamp: 1_533_564_208,
                device_id: "1B2DEB".to_string(),
                temperature: 19.1,
            }],
        };
        let value = serde_json::to_value(&record).expect("record json");
        assert_eq!(value["kind"], "temperature_batch");
        let sample = &value["samples"][0];
        assert_eq!(sample["timestamp"], 1_533_564_208);
        assert_eq!(sample["device_id"], "1B2DEB");
        assert_eq!(sample["temperature"], 19.1);
    }
}
