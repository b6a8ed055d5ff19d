//! Encoder for the SSE wire format
//!
//! The inverse of [`Decoder`](crate::Decoder): serializes [`Event`]s into
//! blank-line-terminated field blocks on any [`std::io::Write`] sink.

use std::io::Write;

use crate::error::{WireError, WireResult};
use crate::event::Event;

/// Writes SSE events to an output sink.
pub struct Encoder<W> {
    w: W,
}

impl<W: Write> Encoder<W> {
    /// Create a new encoder that writes to `w`.
    pub fn new(w: W) -> Self {
        Self { w }
    }

    /// Write a single event field.
    ///
    /// The value must be valid UTF-8 or [`WireError::InvalidEncoding`] is
    /// returned. A value containing newlines is emitted as one
    /// `name: segment` line per segment (a bare `name` line when the
    /// segment is empty) — this is how multi-line values round-trip through
    /// repeated same-named fields. A trailing `\r` on a segment is stripped
    /// before emission.
    pub fn write_field(&mut self, name: &str, value: &[u8]) -> WireResult<()> {
        if std::str::from_utf8(value).is_err() {
            return Err(WireError::InvalidEncoding);
        }

        for segment in value.split(|&b| b == b'\n') {
            let segment = match segment.last() {
                Some(&b'\r') => &segment[..segment.len() - 1],
                _ => segment,
            };

            if segment.is_empty() {
                self.w.write_all(name.as_bytes())?;
            } else {
                self.w.write_all(name.as_bytes())?;
                self.w.write_all(b": ")?;
                self.w.write_all(segment)?;
            }
            self.w.write_all(b"\n")?;
        }

        Ok(())
    }

    /// Write a blank line to terminate the current event, then flush the
    /// sink.
    pub fn flush(&mut self) -> WireResult<()> {
        self.w.write_all(b"\n")?;
        self.w.flush()?;
        Ok(())
    }

    /// Write one complete event.
    ///
    /// Fields are emitted in a fixed order: `id` (only when `reset_id` is
    /// set or `id` is non-empty), `retry` and `event` (only when
    /// non-empty), then `data` — always, even when empty, so that every
    /// event terminates in a well-formed block.
    ///
    /// Note that `reset_id` with a non-empty `id` is not representable on
    /// the wire and will not round-trip.
    pub fn encode(&mut self, event: &Event) -> WireResult<()> {
        if event.reset_id || !event.id.is_empty() {
            self.write_field("id", event.id.as_bytes())?;
        }

        if !event.retry.is_empty() {
            self.write_field("retry", event.retry.as_bytes())?;
        }

        if !event.event_type.is_empty() {
            self.write_field("event", event.event_type.as_bytes())?;
        }

        self.write_field("data", &event.data)?;

        self.flush()
    }

    /// Consume the encoder, returning the underlying sink.
    pub fn into_inner(self) -> W {
        self.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn encode_to_string(event: &Event) -> String {
        let mut enc = Encoder::new(Vec::new());
        enc.encode(event).unwrap();
        String::from_utf8(enc.into_inner()).unwrap()
    }

    #[test]
    fn test_encode_full_event() {
        let event = Event {
            event_type: "custom".into(),
            id: "42".into(),
            retry: "1000".into(),
            data: b"hello".to_vec(),
            reset_id: false,
        };
        assert_eq!(
            encode_to_string(&event),
            "id: 42\nretry: 1000\nevent: custom\ndata: hello\n\n"
        );
    }

    #[test]
    fn test_encode_multiline_data() {
        let event = Event {
            event_type: "message".into(),
            data: b"one\ntwo\r\n\nthree".to_vec(),
            ..Event::default()
        };
        assert_eq!(
            encode_to_string(&event),
            "event: message\ndata: one\ndata: two\ndata\ndata: three\n\n"
        );
    }

    #[test]
    fn test_encode_reset_id() {
        let event = Event {
            event_type: "message".into(),
            reset_id: true,
            ..Event::default()
        };
        assert_eq!(encode_to_string(&event), "id\nevent: message\ndata\n\n");
    }

    #[test]
    fn test_encode_empty_data_still_terminates() {
        let event = Event {
            event_type: "message".into(),
            ..Event::default()
        };
        assert_eq!(encode_to_string(&event), "event: message\ndata\n\n");
    }

    #[test]
    fn test_write_field_rejects_invalid_utf8() {
        let mut enc = Encoder::new(Vec::new());
        let err = enc.write_field("data", b"\xFF\xFE\xFD").unwrap_err();
        assert!(err.is_invalid_encoding());
    }

    #[test]
    fn test_encode_rejects_invalid_data() {
        let event = Event {
            event_type: "message".into(),
            data: vec![0xFF, 0xFE],
            ..Event::default()
        };
        let mut enc = Encoder::new(Vec::new());
        assert!(enc.encode(&event).is_err());
    }
}
