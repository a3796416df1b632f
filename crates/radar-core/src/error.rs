//! Error types for the analysis protocol

use thiserror::Error;

/// Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while encoding or decoding a single frame
///
/// A decode error is always local to one frame. Decoders skip the frame and
/// keep reading.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Payload was not valid JSON or had the wrong shape
    #[error("Malformed frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),

    /// Payload carried none of `text`, `sources` or `error`
    #[error("Frame carries no event")]
    EmptyFrame,

    /// Payload carried more than one event field
    #[error("Frame carries more than one event: {0}")]
    AmbiguousFrame(String),
}
