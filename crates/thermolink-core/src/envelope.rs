//! Inbound envelope boundary.
//!
//! The messaging transport delivers a JSON envelope whose `data` field is a
//! base64-encoded ASCII-hex frame and whose attributes carry the device
//! identifier and the reference timestamp. Unpacking happens here so the
//! frame decoder never sees transport encodings.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::FrameAttributes;

/// Transport envelope as delivered by the messaging layer.
///
/// # Examples
/// ```
/// use thermolink_core::Envelope;
///
/// let envelope: Envelope = serde_json::from_str(
///     r#"{"data":"YzkwMjAwMDE=","attributes":{"device":"1B2DEB","time":"1533564208"}}"#,
/// )?;
/// assert_eq!(envelope.attributes.device, "1B2DEB");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Base64-encoded ASCII-hex frame payload.
    pub data: String,
    /// Attribute bag supplied alongside the payload.
    pub attributes: EnvelopeAttributes,
}

/// Envelope attributes; `device` and `time` are required by the decoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeAttributes {
    /// Device identifier string.
    pub device: String,
    /// Decimal seconds since epoch.
    pub time: String,
    /// Device model tag, passed through untouched.
    #[serde(rename = "deviceType", default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
}

/// Unpacked envelope: the raw hex frame plus the decoder's attribute pair.
#[derive(Debug, Clone)]
pub struct FrameEvent {
    pub raw: String,
    pub attrs: FrameAttributes,
}

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not ASCII text")]
    NotAscii,
    #[error("invalid reference time {value:?}")]
    ReferenceTime { value: String },
}

/// Unpack a transport envelope into the decoder's input pair.
pub fn unpack(envelope: &Envelope) -> Result<FrameEvent, EnvelopeError> {
    let bytes = STANDARD.decode(&envelope.data)?;
    let raw = String::from_utf8(bytes).map_err(|_| EnvelopeError::NotAscii)?;
    if !raw.is_ascii() {
        return Err(EnvelopeError::NotAscii);
    }

    let time = envelope.attributes.time.trim();
    let reference_time = time
        .parse::<i64>()
        .map_err(|_| EnvelopeError::ReferenceTime {
            value: envelope.attributes.time.clone(),
        })?;

    Ok(FrameEvent {
        raw,
        attrs: FrameAttributes {
            device_id: envelope.attributes.device.clone(),
            reference_time,
        },
    })
}
