//! Encode/decode identity over a generated corpus of mixed events.

use std::io;

use bytes::Bytes;
use futures::stream;
use pretty_assertions::assert_eq;
use sse_core::{Decoder, Encoder, Event};

/// A spread of event shapes: custom types, retry overrides, id resets, and
/// the occasional empty payload.
fn mixed_events() -> Vec<Event> {
    (0..1000)
        .map(|i| {
            let mut event = Event {
                event_type: if i % 3 == 0 { "other" } else { "custom" }.to_owned(),
                ..Event::default()
            };

            if i % 5 == 0 {
                event.retry = (i * 1000).to_string();
            }

            if i % 10 == 0 {
                event.reset_id = true;
            } else {
                event.id = i.to_string();
            }

            if i % 20 != 0 {
                event.data = i.to_string().into_bytes();
            }

            event
        })
        .collect()
}

#[tokio::test]
async fn encode_decode_identity() {
    let input = mixed_events();

    let mut enc = Encoder::new(Vec::new());
    for event in &input {
        enc.encode(event).unwrap();
    }

    let wire = enc.into_inner();
    let mut dec = Decoder::new(stream::iter(vec![Ok::<_, io::Error>(Bytes::from(wire))]));

    let mut output = Vec::with_capacity(input.len());
    while let Ok(event) = dec.decode().await {
        output.push(event);
    }

    assert_eq!(input, output);
}
