//! The unit of exchange on an event stream

/// A single event, as written to an event stream or read from one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    /// Event name. Decoding fills in `"message"` when the wire carries no
    /// `event` field, so this is never empty after a successful decode.
    pub event_type: String,

    /// Last-event-id associated with this event. The empty string is a
    /// valid value, distinct from the field being absent (see `reset_id`).
    pub id: String,

    /// Reconnection interval override in milliseconds, verbatim from the
    /// wire. Empty when the wire sent no `retry` field; no numeric
    /// validation happens at decode time.
    pub retry: String,

    /// Raw payload. Multiple `data` fields within one event block are
    /// joined with `\n` in arrival order.
    pub data: Vec<u8>,

    /// True when the wire sent an explicit empty `id` field, telling the
    /// client to clear its remembered last-event-id.
    pub reset_id: bool,
}
