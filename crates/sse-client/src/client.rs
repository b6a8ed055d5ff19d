//! The event source client: a connect/read/reconnect state machine

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::BoxStream;
use mime::Mime;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CACHE_CONTROL};
use reqwest::StatusCode;
use tokio::sync::Notify;
use tracing::{debug, warn};
use url::Url;

use sse_core::{Decoder, Event, WireError};

use crate::error::{ClientError, Result};
use crate::transport::{StreamRequest, Transport, TransportError};

/// Retry interval used when the configuration supplies none.
const DEFAULT_RETRY: Duration = Duration::from_secs(1);

/// Resumption header carrying the sticky last-event-id.
const LAST_EVENT_ID: HeaderName = HeaderName::from_static("last-event-id");

/// Configuration for an [`EventSource`].
pub struct Config {
    url: Url,
    headers: HeaderMap,
    retry: Duration,
    transport: Arc<dyn Transport>,
}

impl Config {
    /// Configuration with defaults: a fresh [`reqwest::Client`] transport,
    /// no extra headers, and a 1 second retry interval.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            headers: HeaderMap::new(),
            retry: DEFAULT_RETRY,
            transport: Arc::new(reqwest::Client::new()),
        }
    }

    /// Initial wait between reconnection attempts. Zero falls back to the
    /// default; the server may override the interval via `retry` fields.
    pub fn retry(mut self, retry: Duration) -> Self {
        self.retry = retry;
        self
    }

    /// Extra headers sent on every connection attempt.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Replace the transport used to issue requests.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }
}

/// Close flag shared between an [`EventSource`] and its [`Closer`] handles.
#[derive(Default)]
struct CloseSignal {
    closed: AtomicBool,
    notify: Notify,
}

impl CloseSignal {
    fn set(&self) {
        self.closed.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    fn is_set(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Resolves once the signal is set, however long ago that happened.
    async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_set() {
                return;
            }
            notified.await;
        }
    }
}

/// Handle that closes an [`EventSource`] from another task.
///
/// This is the one operation safe to trigger concurrently with `read()`:
/// closing unblocks a stalled read (dropping the in-flight connection) and
/// makes it return [`ClientError::Closed`].
#[derive(Clone)]
pub struct Closer {
    signal: Arc<CloseSignal>,
}

impl Closer {
    /// Close the associated event source.
    pub fn close(&self) {
        self.signal.set();
    }
}

/// Consumes server-sent events over HTTP with automatic recovery.
///
/// One instance owns one logical subscription and is meant for a single
/// consumer pulling events sequentially with [`read`](Self::read). There is
/// no internal locking; use a [`Closer`] for the sole cross-task operation.
pub struct EventSource {
    transport: Arc<dyn Transport>,
    request: StreamRequest,
    retry: Duration,
    last_event_id: String,
    decoder: Option<Decoder<BoxStream<'static, io::Result<Bytes>>>>,
    /// Whether any connection ever succeeded; reconnects wait the retry
    /// interval only after that point.
    had_connection: bool,
    /// Terminal error; once set, no further reconnection is attempted.
    err: Option<ClientError>,
    close_signal: Arc<CloseSignal>,
}

impl EventSource {
    /// Create an event source for `url` with default configuration.
    pub fn new(url: Url) -> Self {
        Self::with_config(Config::new(url))
    }

    /// Create an event source from a [`Config`].
    pub fn with_config(config: Config) -> Self {
        let mut headers = config.headers;
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let retry = if config.retry.is_zero() {
            DEFAULT_RETRY
        } else {
            config.retry
        };

        Self {
            transport: config.transport,
            request: StreamRequest {
                url: config.url,
                headers,
            },
            retry,
            last_event_id: String::new(),
            decoder: None,
            had_connection: false,
            err: None,
            close_signal: Arc::new(CloseSignal::default()),
        }
    }

    /// The sticky last-event-id echoed back to the server on reconnects.
    pub fn last_event_id(&self) -> &str {
        &self.last_event_id
    }

    /// The current wait between reconnection attempts.
    pub fn retry_interval(&self) -> Duration {
        self.retry
    }

    /// A cloneable handle that closes this source from another task.
    pub fn closer(&self) -> Closer {
        Closer {
            signal: Arc::clone(&self.close_signal),
        }
    }

    /// Close the source, releasing the active connection. Any in-flight or
    /// future [`read`](Self::read) returns [`ClientError::Closed`].
    pub fn close(&mut self) {
        self.close_signal.set();
        self.decoder = None;
        self.err = Some(ClientError::Closed);
    }

    /// Connect to the endpoint, validate the response, and classify every
    /// outcome as success, recoverable, or fatal. Loops until a stream is
    /// bound or a terminal error is recorded.
    async fn connect(&mut self) {
        while self.err.is_none() {
            if self.close_signal.is_set() {
                self.err = Some(ClientError::Closed);
                break;
            }

            if self.had_connection {
                // Release the previous connection and wait before trying
                // again. Initial attempts retry immediately.
                self.decoder = None;
                let interrupted = tokio::select! {
                    _ = self.close_signal.wait() => true,
                    _ = tokio::time::sleep(self.retry) => false,
                };
                if interrupted {
                    continue;
                }
            }

            let mut request = self.request.clone();
            let last_id = HeaderValue::from_str(&self.last_event_id)
                .unwrap_or_else(|_| HeaderValue::from_static(""));
            request.headers.insert(LAST_EVENT_ID, last_id);

            debug!(url = %request.url, "connecting to event stream");

            let outcome = tokio::select! {
                _ = self.close_signal.wait() => None,
                result = self.transport.execute(request) => Some(result),
            };
            let Some(result) = outcome else {
                continue; // closed mid-request; latched at the loop top
            };

            match result {
                Err(TransportError::Cancelled) => {
                    self.err = Some(ClientError::Cancelled);
                }
                Err(TransportError::Failed(err)) => {
                    // Assumed non-fatal, whatever it was.
                    warn!(error = %err, "connection attempt failed, retrying");
                }
                Ok(response) if response.status.as_u16() >= 500 => {
                    // 5xx are assumed to be temporary.
                    debug!(status = %response.status, "server error, retrying");
                }
                Ok(response) if response.status == StatusCode::NO_CONTENT => {
                    // The server says there is nothing more to stream.
                    self.err = Some(ClientError::Closed);
                }
                Ok(response) if response.status == StatusCode::OK => {
                    if is_event_stream(response.content_type.as_deref()) {
                        self.decoder = Some(Decoder::new(response.body));
                        self.had_connection = true;
                        return;
                    }
                    self.err = Some(ClientError::InvalidContentType(
                        response.content_type.unwrap_or_default(),
                    ));
                }
                Ok(response) => {
                    self.err = Some(ClientError::UnexpectedStatus(response.status));
                }
            }
        }
    }

    /// Read the next event.
    ///
    /// Blocks until an event with a non-empty payload arrives, absorbing
    /// recoverable failures by reconnecting. Sticky state is updated only
    /// from fully decoded events: a non-empty `id` (or an explicit reset)
    /// replaces the last-event-id, and a parseable `retry` value replaces
    /// the reconnect interval. Once a terminal error is recorded, every
    /// call returns that same error.
    pub async fn read(&mut self) -> Result<Event> {
        if self.err.is_none() && self.decoder.is_none() {
            self.connect().await;
        }

        loop {
            if let Some(err) = &self.err {
                return Err(err.clone());
            }

            let Some(decoder) = self.decoder.as_mut() else {
                self.connect().await;
                continue;
            };

            let decoded = tokio::select! {
                _ = self.close_signal.wait() => None,
                result = decoder.decode() => Some(result),
            };
            let Some(result) = decoded else {
                self.decoder = None;
                self.err = Some(ClientError::Closed);
                continue;
            };

            match result {
                // Malformed lines are skipped, not stream-fatal.
                Err(WireError::InvalidEncoding) => continue,
                Err(err) => {
                    // The connection is dead; reconnect and resume.
                    debug!(error = %err, "stream interrupted, reconnecting");
                    self.connect().await;
                }
                Ok(event) => {
                    if event.data.is_empty() {
                        continue; // not a deliverable event
                    }

                    if !event.id.is_empty() || event.reset_id {
                        self.last_event_id = event.id.clone();
                    }

                    if !event.retry.is_empty() {
                        match event.retry.parse::<u64>() {
                            Ok(ms) => self.retry = Duration::from_millis(ms),
                            Err(_) => {
                                debug!(retry = %event.retry, "ignoring malformed retry field")
                            }
                        }
                    }

                    return Ok(event);
                }
            }
        }
    }
}

/// Media-type match only; parameters are ignored.
fn is_event_stream(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.parse::<Mime>().ok())
        .is_some_and(|m| m.essence_str() == mime::TEXT_EVENT_STREAM.essence_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_event_stream() {
        assert!(is_event_stream(Some("text/event-stream")));
        assert!(is_event_stream(Some("text/event-stream; charset=utf-8")));
        assert!(is_event_stream(Some("TEXT/EVENT-STREAM")));
        assert!(!is_event_stream(Some("text/html")));
        assert!(!is_event_stream(Some("not a media type")));
        assert!(!is_event_stream(None));
    }

    #[test]
    fn test_config_defaults() {
        let url = Url::parse("http://example.com/events").unwrap();
        let source = EventSource::with_config(Config::new(url).retry(Duration::ZERO));
        assert_eq!(source.retry_interval(), DEFAULT_RETRY);
        assert_eq!(source.last_event_id(), "");
    }

    #[tokio::test]
    async fn test_close_signal_wait_after_set() {
        let signal = CloseSignal::default();
        signal.set();
        // Must resolve even though the notification predates the wait.
        signal.wait().await;
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_terminal() {
        let url = Url::parse("http://example.com/events").unwrap();
        let mut source = EventSource::new(url);
        source.close();

        assert_eq!(source.read().await, Err(ClientError::Closed));
        assert_eq!(source.read().await, Err(ClientError::Closed));
    }
}
