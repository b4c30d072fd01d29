use thiserror::Error;

/// Errors returned by frame decoding.
///
/// Note: the hex-field failures live in [`FieldError`]; the parser wraps
/// them so callers see exactly two decode failure kinds.
///
/// # Examples
/// ```text
/// use thermolink_core::frame::error::DecodeError;
///
/// let err = DecodeError::UnsupportedMode { mode: "ff".to_string() };
/// assert!(err.to_string().contains("unsupported frame mode"));
/// ```
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unsupported frame mode {mode:?}")]
    UnsupportedMode { mode: String },
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] FieldError),
}

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("frame too short: need {needed} hex chars, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("invalid hex field at chars {start}..{end}: {value:?}")]
    NotHex {
        start: usize,
        end: usize,
        value: String,
    },
}
