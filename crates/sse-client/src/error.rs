//! Error types for the event source client

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for event source operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Terminal errors reported by [`EventSource::read`](crate::EventSource::read).
///
/// All of these are fatal per client instance: once one is returned, no
/// further reconnection is attempted and every subsequent read returns the
/// same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The source was explicitly closed, or the server answered
    /// `204 No Content` to signal there is nothing more to stream
    #[error("event source closed")]
    Closed,

    /// The caller aborted the request through the transport
    #[error("request cancelled")]
    Cancelled,

    /// The endpoint answered 200 with something other than
    /// `text/event-stream`
    #[error("invalid response Content-Type ({0:?})")]
    InvalidContentType(String),

    /// The endpoint answered with a status the protocol cannot recover from
    #[error("endpoint returned unrecoverable status {0}")]
    UnexpectedStatus(StatusCode),
}
