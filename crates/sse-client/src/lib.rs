//! sse-client - Reconnecting Server-Sent Events client
//!
//! Consumes an SSE endpoint over HTTP with automatic recovery: one logical
//! subscription per [`EventSource`], cycling through connect → read →
//! reconnect while preserving delivery continuity via the last seen event
//! id.
//!
//! # Example
//!
//! ```no_run
//! use sse_client::EventSource;
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let url = Url::parse("http://localhost:8080/events")?;
//! let mut source = EventSource::new(url);
//!
//! loop {
//!     let event = source.read().await?;
//!     println!("{}: {:?}", event.event_type, event.data);
//! }
//! # }
//! ```
//!
//! Recoverable failures (transport errors, 5xx responses, a dropped stream)
//! are absorbed by waiting the current retry interval and reconnecting with
//! a `Last-Event-Id` header. Fatal conditions (a 204, a wrong content type,
//! any other unexpected status, cancellation, or an explicit close) latch a
//! terminal error that every later [`EventSource::read`] returns.

mod client;
mod error;
pub mod testing;
mod transport;

pub use client::{Closer, Config, EventSource};
pub use error::{ClientError, Result};
pub use transport::{StreamRequest, StreamResponse, Transport, TransportError};

// Re-export the event type read from the stream
pub use sse_core::Event;
