//! Frame encoding for the analysis stream
//!
//! A frame is one compact JSON object followed by [`FRAME_DELIMITER`]. The
//! delimiter is made of ASCII word characters only, so inside a serialized
//! event it can appear solely within a string value. The encoder breaks every
//! such occurrence by writing its leading underscore as a JSON unicode escape,
//! which decodes back to the same text.

use crate::error::Result;
use crate::event::AnalysisEvent;

/// Token terminating every frame
pub const FRAME_DELIMITER: &str = "__END_OF_OBJECT__";

const ESCAPED_UNDERSCORE: &str = r"\u005f";

/// Serialize an event into its JSON payload without the delimiter
///
/// The returned payload never contains [`FRAME_DELIMITER`].
pub fn encode_payload(event: &AnalysisEvent) -> Result<String> {
    let mut payload = serde_json::to_string(event)?;

    // Overlapping occurrences ("__END_OF_OBJECT__END_OF_OBJECT__") can survive
    // a single pass, so rescan until none are left.
    while let Some(start) = payload.find(FRAME_DELIMITER) {
        payload.replace_range(start..=start, ESCAPED_UNDERSCORE);
    }

    Ok(payload)
}

/// Serialize an event into a complete frame, delimiter included
pub fn encode_frame(event: &AnalysisEvent) -> Result<Vec<u8>> {
    let mut frame = encode_payload(event)?;
    frame.push_str(FRAME_DELIMITER);
    Ok(frame.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SourceRef;

    #[test]
    fn test_encode_text_frame() {
        let frame = encode_frame(&AnalysisEvent::text("Hello ")).unwrap();
        assert_eq!(frame, br#"{"text":"Hello "}__END_OF_OBJECT__"#.to_vec());
    }

    #[test]
    fn test_encode_sources_frame() {
        let frame = encode_frame(&AnalysisEvent::sources(vec![SourceRef::new("x", "X")])).unwrap();
        assert_eq!(
            String::from_utf8(frame).unwrap(),
            r#"{"sources":[{"uri":"x","title":"X"}]}__END_OF_OBJECT__"#
        );
    }

    #[test]
    fn test_delimiter_inside_text_is_escaped() {
        let text = "before __END_OF_OBJECT__ after";
        let payload = encode_payload(&AnalysisEvent::text(text)).unwrap();

        assert!(!payload.contains(FRAME_DELIMITER));
        let decoded: AnalysisEvent = serde_json::from_str(&payload).unwrap();
        assert_eq!(decoded, AnalysisEvent::text(text));
    }

    #[test]
    fn test_overlapping_delimiters_are_escaped() {
        let text = "___END_OF_OBJECT__END_OF_OBJECT___";
        let payload = encode_payload(&AnalysisEvent::text(text)).unwrap();

        assert!(!payload.contains(FRAME_DELIMITER));
        let decoded: AnalysisEvent = serde_json::from_str(&payload).unwrap();
        assert_eq!(decoded, AnalysisEvent::text(text));
    }

    #[test]
    fn test_escaping_after_backslash() {
        let text = r"C:\__END_OF_OBJECT__";
        let payload = encode_payload(&AnalysisEvent::text(text)).unwrap();

        assert!(!payload.contains(FRAME_DELIMITER));
        let decoded: AnalysisEvent = serde_json::from_str(&payload).unwrap();
        assert_eq!(decoded, AnalysisEvent::text(text));
    }

    #[test]
    fn test_plain_underscores_untouched() {
        let payload = encode_payload(&AnalysisEvent::text("snake_case_name")).unwrap();
        assert_eq!(payload, r#"{"text":"snake_case_name"}"#);
    }
}
