//! Decoder for the SSE wire format
//!
//! Reads a stream of byte chunks (the shape of a streaming HTTP response
//! body) and reassembles it into lines, fields, and finally [`Event`]s.

use std::io;

use bytes::{Buf, Bytes, BytesMut};
use futures::{Stream, StreamExt};
use tracing::trace;

use crate::error::{WireError, WireResult};
use crate::event::Event;

/// UTF-8 encoding of U+FEFF.
const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decodes SSE events from a stream of byte chunks.
///
/// Chunk boundaries carry no meaning: lines are buffered until complete,
/// however they were fragmented on the wire.
pub struct Decoder<S> {
    stream: S,
    /// Buffer for data received but not yet consumed as lines
    buf: BytesMut,
    /// Set once the underlying stream has ended
    eof: bool,
    /// A byte order mark is stripped only on the very first read
    checked_bom: bool,
}

impl<S> Decoder<S>
where
    S: Stream<Item = Result<Bytes, io::Error>> + Unpin,
{
    /// Create a new decoder that reads from `stream`.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buf: BytesMut::new(),
            eof: false,
            checked_bom: false,
        }
    }

    /// Pull one more chunk from the underlying stream into the buffer.
    async fn fill(&mut self) -> WireResult<()> {
        match self.stream.next().await {
            Some(Ok(chunk)) => {
                self.buf.extend_from_slice(&chunk);
                Ok(())
            }
            Some(Err(err)) => Err(WireError::Io(err)),
            None => {
                self.eof = true;
                Ok(())
            }
        }
    }

    /// Buffer one complete line, however long, and return it without its
    /// terminator. Handles `\n` and `\r\n`; a final unterminated line before
    /// end of stream is returned as a line of its own.
    async fn next_line(&mut self) -> WireResult<Vec<u8>> {
        loop {
            if !self.checked_bom {
                if self.buf.len() < BOM.len() && !self.eof {
                    self.fill().await?;
                    continue;
                }
                if self.buf.starts_with(BOM) {
                    self.buf.advance(BOM.len());
                }
                self.checked_bom = true;
            }

            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let mut line = self.buf.split_to(pos);
                self.buf.advance(1); // skip the newline
                if line.last() == Some(&b'\r') {
                    line.truncate(line.len() - 1);
                }
                return Ok(line.to_vec());
            }

            if self.eof {
                if self.buf.is_empty() {
                    return Err(WireError::UnexpectedEof);
                }
                let mut line = self.buf.split_to(self.buf.len());
                if line.last() == Some(&b'\r') {
                    line.truncate(line.len() - 1);
                }
                return Ok(line.to_vec());
            }

            self.fill().await?;
        }
    }

    /// Read a single line from the stream and parse it as a field.
    ///
    /// A complete event is signalled by an empty name and an empty value.
    /// The line is split on the first `:`; if the value begins with exactly
    /// one space it is stripped, with no further trimming. Returns
    /// [`WireError::InvalidEncoding`] when the name or value is not valid
    /// UTF-8 — the stream itself is still decodable after that.
    pub async fn read_field(&mut self) -> WireResult<(String, String)> {
        let line = self.next_line().await?;

        if line.is_empty() {
            return Ok((String::new(), String::new()));
        }

        let (name, value) = match line.iter().position(|&b| b == b':') {
            Some(pos) => (&line[..pos], &line[pos + 1..]),
            None => (&line[..], &line[line.len()..]),
        };

        // §7. If value starts with a U+0020 SPACE character, remove it.
        let value = match value.first() {
            Some(b' ') => &value[1..],
            _ => value,
        };

        let name = std::str::from_utf8(name).map_err(|_| WireError::InvalidEncoding)?;
        let value = std::str::from_utf8(value).map_err(|_| WireError::InvalidEncoding)?;

        Ok((name.to_owned(), value.to_owned()))
    }

    /// Read the next event from the stream.
    ///
    /// Fields accumulate until a blank line terminates the event block. Any
    /// error from [`read_field`](Self::read_field) is returned unchanged,
    /// including `InvalidEncoding`; skipping malformed lines is the
    /// caller's call, not the decoder's.
    pub async fn decode(&mut self) -> WireResult<Event> {
        let mut event = Event {
            event_type: "message".to_owned(), // default event type
            ..Event::default()
        };
        let mut wrote_data = false;

        loop {
            let (name, value) = self.read_field().await?;

            if name.is_empty() && value.is_empty() {
                break;
            }

            match name.as_str() {
                "id" => {
                    if value.is_empty() {
                        event.reset_id = true;
                    }
                    event.id = value;
                }
                "retry" => event.retry = value,
                "event" => event.event_type = value,
                "data" => {
                    if wrote_data {
                        event.data.push(b'\n');
                    } else {
                        wrote_data = true;
                    }
                    event.data.extend_from_slice(value.as_bytes());
                }
                _ => trace!(field = %name, "ignoring unknown field"),
            }
        }

        Ok(event)
    }
}
