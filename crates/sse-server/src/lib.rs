//! sse-server - Axum adapter for serving Server-Sent Events
//!
//! A thin layer over a generic HTTP server: content negotiation on the way
//! in, wire encoding on the way out. The protocol itself lives in
//! `sse-core`.
//!
//! # Example
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use futures::stream;
//! use sse_server::{Event, EventStream, EventStreamRequest};
//!
//! async fn events(request: EventStreamRequest) -> EventStream<impl futures::Stream<Item = Event>> {
//!     // Resume from request.last_event_id as the application sees fit.
//!     EventStream::new(stream::iter(vec![Event {
//!         event_type: "message".to_owned(),
//!         data: b"hello".to_vec(),
//!         ..Event::default()
//!     }]))
//! }
//!
//! let app: Router = Router::new().route("/events", get(events));
//! ```
//!
//! Client disconnects surface as the response stream being dropped;
//! applications feeding events through a channel observe the receiver side
//! going away.

mod accept;

use axum::body::Body;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::warn;

use sse_core::Encoder;

pub use accept::accepts_event_stream;
pub use sse_core::Event;

/// Extractor that performs the event-stream content negotiation.
///
/// Rejects the request with `406 Not Acceptable` when its `Accept` header
/// cannot accept `text/event-stream`, and exposes the `Last-Event-Id`
/// header so handlers can resume a subscription where it left off.
#[derive(Debug)]
pub struct EventStreamRequest {
    /// The client's resumption token, when it sent one
    pub last_event_id: Option<String>,
}

impl<S> FromRequestParts<S> for EventStreamRequest
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let accept = parts
            .headers
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok());

        if !accepts_event_stream(accept) {
            return Err((
                StatusCode::NOT_ACCEPTABLE,
                "this endpoint only serves text/event-stream",
            ));
        }

        let last_event_id = parts
            .headers
            .get("last-event-id")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        Ok(Self { last_event_id })
    }
}

/// Streaming response that frames each [`Event`] in the SSE wire format.
///
/// Sets `Content-Type: text/event-stream` and `Cache-Control: no-cache`
/// and encodes one body chunk per event. An event that cannot be encoded
/// (a payload that is not valid UTF-8) is skipped with a warning rather
/// than corrupting the framing of the events after it.
pub struct EventStream<S> {
    stream: S,
}

impl<S> EventStream<S> {
    /// Wrap a stream of events as an HTTP response.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }
}

impl<S> IntoResponse for EventStream<S>
where
    S: Stream<Item = Event> + Send + 'static,
{
    fn into_response(self) -> Response {
        let frames = self.stream.filter_map(|event| async move {
            let mut encoder = Encoder::new(Vec::new());
            match encoder.encode(&event) {
                Ok(()) => Some(Ok::<_, std::convert::Infallible>(Bytes::from(
                    encoder.into_inner(),
                ))),
                Err(err) => {
                    warn!(error = %err, event_type = %event.event_type, "skipping unencodable event");
                    None
                }
            }
        });

        (
            [
                (header::CONTENT_TYPE, "text/event-stream"),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            Body::from_stream(frames),
        )
            .into_response()
    }
}
