//! Accept-header negotiation for event streams

use mime::Mime;

/// True when the `Accept` header allows `text/event-stream`.
///
/// Matches media ranges, so `text/*` and `*/*` are acceptable; parameters
/// such as `q` values are ignored. An absent or empty header accepts
/// anything.
pub fn accepts_event_stream(accept: Option<&str>) -> bool {
    let Some(accept) = accept else {
        return true;
    };
    if accept.trim().is_empty() {
        return true;
    }

    accept.split(',').any(|range| {
        let Ok(range) = range.trim().parse::<Mime>() else {
            return false;
        };
        if range.type_() == mime::STAR {
            return true;
        }
        range.type_() == mime::TEXT
            && (range.subtype() == mime::STAR || range.subtype().as_str() == "event-stream")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_event_stream() {
        let cases = [
            (None, true),
            (Some(""), true),
            (Some("text/event-stream"), true),
            (Some("text/*"), true),
            (Some("*/*"), true),
            (Some("text/event-stream; q=1.0"), true),
            (Some("text/*; q=1.0"), true),
            (Some("*/*; q=1.0"), true),
            (Some("text/html; q=1.0, text/*; q=0.8"), true),
            (
                Some("text/html; q=1.0, image/gif; q=0.6, image/jpeg; q=0.6"),
                false,
            ),
            (Some("application/json"), false),
        ];

        for (accept, want) in cases {
            assert_eq!(
                accepts_event_stream(accept),
                want,
                "accept header {accept:?}"
            );
        }
    }
}
