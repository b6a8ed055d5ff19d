//! sse-core - Codec for the Server-Sent Events wire format
//!
//! This crate provides the framing layer of SSE: a [`Decoder`] that turns a
//! stream of raw bytes into discrete [`Event`]s, and an [`Encoder`] that
//! serializes events back into the wire format. Neither side knows anything
//! about HTTP or reconnection; that lives in `sse-client`.
//!
//! # Wire format
//!
//! ```text
//! [optional U+FEFF byte order mark, stream start only]
//! field-name[":"[" "]field-value]
//! ...
//! <blank line terminates one event>
//! ```
//!
//! Recognized field names are `id`, `event`, `retry`, and `data`; anything
//! else is ignored on decode.

pub mod decoder;
pub mod encoder;
pub mod error;
mod event;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{WireError, WireResult};
pub use event::Event;
