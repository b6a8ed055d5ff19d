//! Error types for the SSE codec

use thiserror::Error;

/// Result type for codec operations
pub type WireResult<T> = std::result::Result<T, WireError>;

/// Errors that can occur while encoding or decoding the SSE wire format
#[derive(Debug, Error)]
pub enum WireError {
    /// A field name or value was not valid UTF-8. Local to one field: a
    /// decoding caller may skip the line and keep reading the same stream.
    #[error("invalid UTF-8 sequence")]
    InvalidEncoding,

    /// The underlying stream ended
    #[error("unexpected end of stream")]
    UnexpectedEof,

    /// The underlying stream or sink failed
    #[error("stream error: {0}")]
    Io(#[from] std::io::Error),
}

impl WireError {
    /// True for errors local to a single field, after which the stream is
    /// still decodable.
    pub fn is_invalid_encoding(&self) -> bool {
        matches!(self, WireError::InvalidEncoding)
    }
}
