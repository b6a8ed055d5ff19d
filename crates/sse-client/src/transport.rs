//! Abstract HTTP transport
//!
//! The client's sole point of contact with the network stack: anything that
//! can execute one request and hand back a status, a content type, and a
//! readable body. A blanket implementation for [`reqwest::Client`] is
//! provided; tests and embedders can supply their own.

use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

/// One connection attempt, issued fresh on every (re)connect.
#[derive(Debug, Clone)]
pub struct StreamRequest {
    /// Endpoint to GET
    pub url: Url,
    /// Headers to send, including the resumption `Last-Event-Id`
    pub headers: HeaderMap,
}

/// The response surface the client needs from a transport.
pub struct StreamResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Verbatim `Content-Type` header, when present
    pub content_type: Option<String>,
    /// The response body as a stream of chunks. Dropping it releases the
    /// connection.
    pub body: BoxStream<'static, io::Result<Bytes>>,
}

/// Errors surfaced by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The caller aborted the request. Fatal: the client stops
    /// reconnecting.
    #[error("request cancelled")]
    Cancelled,

    /// Any other transport failure (timeout, refused connection, DNS, ...).
    /// Recoverable: the client retries.
    #[error("transport error: {0}")]
    Failed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Executes one streaming HTTP request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: StreamRequest) -> Result<StreamResponse, TransportError>;
}

#[async_trait]
impl Transport for reqwest::Client {
    async fn execute(&self, request: StreamRequest) -> Result<StreamResponse, TransportError> {
        let response = self
            .get(request.url)
            .headers(request.headers)
            .send()
            .await
            .map_err(|err| TransportError::Failed(err.into()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response
            .bytes_stream()
            .map_err(io::Error::other)
            .boxed();

        Ok(StreamResponse {
            status,
            content_type,
            body,
        })
    }
}
