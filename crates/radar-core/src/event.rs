//! Analysis events carried by the streaming protocol

use crate::error::ProtocolError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// One decoded unit of a streamed analysis
///
/// On the wire every variant is a JSON object with exactly one key:
/// `{"text": ...}`, `{"sources": [...]}` or `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisEvent {
    /// Incremental text fragment
    Text {
        /// Fragment to append to the narrative
        text: String,
    },

    /// Deduplicated citations for the turn
    Sources {
        /// Sources in first-seen order
        sources: Vec<SourceRef>,
    },

    /// Terminal or per-stream error message
    Error {
        /// User facing message
        error: String,
    },
}

impl AnalysisEvent {
    /// Create a text event
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a sources event
    pub fn sources(sources: Vec<SourceRef>) -> Self {
        Self::Sources { sources }
    }

    /// Create an error event
    pub fn error(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
        }
    }

    /// Returns true for the error variant
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

#[derive(Deserialize)]
struct RawEvent {
    text: Option<String>,
    sources: Option<Vec<SourceRef>>,
    error: Option<String>,
}

impl TryFrom<RawEvent> for AnalysisEvent {
    type Error = ProtocolError;

    fn try_from(raw: RawEvent) -> Result<AnalysisEvent, ProtocolError> {
        match (raw.text, raw.sources, raw.error) {
            (Some(text), None, None) => Ok(AnalysisEvent::Text { text }),
            (None, Some(sources), None) => Ok(AnalysisEvent::Sources { sources }),
            (None, None, Some(error)) => Ok(AnalysisEvent::Error { error }),
            (None, None, None) => Err(ProtocolError::EmptyFrame),
            (text, sources, error) => {
                let present: Vec<&str> = [
                    text.as_ref().map(|_| "text"),
                    sources.as_ref().map(|_| "sources"),
                    error.as_ref().map(|_| "error"),
                ]
                .into_iter()
                .flatten()
                .collect();
                Err(ProtocolError::AmbiguousFrame(present.join(", ")))
            }
        }
    }
}

impl<'de> Deserialize<'de> for AnalysisEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawEvent::deserialize(deserializer)?;
        Self::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// A web source cited by the grounded model
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    /// Link target, unique within one source list
    pub uri: String,
    /// Page title, or [`SourceRef::UNKNOWN_TITLE`]
    pub title: String,
}

impl SourceRef {
    /// Placeholder used when the upstream omits a title
    pub const UNKNOWN_TITLE: &'static str = "Unknown";

    /// Create a source reference
    pub fn new(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            title: title.into(),
        }
    }

    /// Build a source from optional upstream fields
    ///
    /// Returns `None` when the uri is missing or empty. A missing or empty
    /// title becomes [`SourceRef::UNKNOWN_TITLE`].
    pub fn from_parts(uri: Option<&str>, title: Option<&str>) -> Option<Self> {
        let uri = uri.filter(|u| !u.is_empty())?;
        let title = title
            .filter(|t| !t.is_empty())
            .unwrap_or(Self::UNKNOWN_TITLE);
        Some(Self::new(uri, title))
    }
}

/// Remove sources with a repeated uri, keeping the first occurrence
///
/// Matching is exact and case-sensitive. Output order follows input order.
pub fn dedupe_sources<I>(sources: I) -> Vec<SourceRef>
where
    I: IntoIterator<Item = SourceRef>,
{
    let mut seen = HashSet::new();
    sources
        .into_iter()
        .filter(|source| seen.insert(source.uri.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_as_single_key_object() {
        let json = serde_json::to_string(&AnalysisEvent::text("Hello")).unwrap();
        assert_eq!(json, r#"{"text":"Hello"}"#);

        let json = serde_json::to_string(&AnalysisEvent::sources(vec![SourceRef::new(
            "https://a.example",
            "A",
        )]))
        .unwrap();
        assert_eq!(json, r#"{"sources":[{"uri":"https://a.example","title":"A"}]}"#);

        let json = serde_json::to_string(&AnalysisEvent::error("boom")).unwrap();
        assert_eq!(json, r#"{"error":"boom"}"#);
    }

    #[test]
    fn test_event_deserialization() {
        let event: AnalysisEvent = serde_json::from_str(r#"{"text":"Hi"}"#).unwrap();
        assert_eq!(event, AnalysisEvent::text("Hi"));

        let event: AnalysisEvent =
            serde_json::from_str(r#"{"sources":[{"uri":"x","title":"X"}]}"#).unwrap();
        assert_eq!(event, AnalysisEvent::sources(vec![SourceRef::new("x", "X")]));

        let event: AnalysisEvent = serde_json::from_str(r#"{"error":"nope"}"#).unwrap();
        assert!(event.is_error());
    }

    #[test]
    fn test_event_ignores_unknown_keys() {
        let event: AnalysisEvent =
            serde_json::from_str(r#"{"text":"Hi","model":"flash"}"#).unwrap();
        assert_eq!(event, AnalysisEvent::text("Hi"));
    }

    #[test]
    fn test_event_rejects_empty_and_ambiguous_objects() {
        let err = serde_json::from_str::<AnalysisEvent>("{}").unwrap_err();
        assert!(err.to_string().contains("no event"));

        let err = serde_json::from_str::<AnalysisEvent>(r#"{"text":"a","error":"b"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("text, error"));

        assert!(serde_json::from_str::<AnalysisEvent>(r#"{"text":42}"#).is_err());
    }

    #[test]
    fn test_source_from_parts() {
        assert_eq!(
            SourceRef::from_parts(Some("https://a"), None),
            Some(SourceRef::new("https://a", "Unknown"))
        );
        assert_eq!(
            SourceRef::from_parts(Some("https://a"), Some("")),
            Some(SourceRef::new("https://a", "Unknown"))
        );
        assert_eq!(SourceRef::from_parts(Some(""), Some("Title")), None);
        assert_eq!(SourceRef::from_parts(None, Some("Title")), None);
    }

    #[test]
    fn test_dedupe_first_occurrence_wins() {
        let candidates = [
            SourceRef::from_parts(Some("a"), Some("A")),
            SourceRef::from_parts(Some("b"), None),
            SourceRef::from_parts(Some("a"), Some("A2")),
        ];

        let sources = dedupe_sources(candidates.into_iter().flatten());

        assert_eq!(
            sources,
            vec![SourceRef::new("a", "A"), SourceRef::new("b", "Unknown")]
        );
    }

    #[test]
    fn test_dedupe_is_case_sensitive() {
        let sources = dedupe_sources(vec![
            SourceRef::new("https://A.example", "upper"),
            SourceRef::new("https://a.example", "lower"),
        ]);
        assert_eq!(sources.len(), 2);
    }
}
