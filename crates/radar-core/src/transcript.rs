//! Accumulated state of one analysis turn

use crate::event::{AnalysisEvent, SourceRef, dedupe_sources};

/// Text, sources and errors received for the current analysis turn
///
/// Owned by the consumer for one turn. Call [`AnalysisTranscript::reset`]
/// before issuing a new query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisTranscript {
    text: String,
    sources: Vec<SourceRef>,
    errors: Vec<String>,
}

impl AnalysisTranscript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the transcript
    pub fn apply(&mut self, event: &AnalysisEvent) {
        match event {
            AnalysisEvent::Text { text } => self.text.push_str(text),
            AnalysisEvent::Sources { sources } => {
                let mut merged = std::mem::take(&mut self.sources);
                merged.extend(sources.iter().cloned());
                self.sources = dedupe_sources(merged);
            }
            AnalysisEvent::Error { error } => self.errors.push(error.clone()),
        }
    }

    /// Clear everything for a new turn
    pub fn reset(&mut self) {
        self.text.clear();
        self.sources.clear();
        self.errors.clear();
    }

    /// Narrative text received so far
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Deduplicated sources received so far
    pub fn sources(&self) -> &[SourceRef] {
        &self.sources
    }

    /// Error messages received so far
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// True once any error event arrived
    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    /// True if nothing has been applied since the last reset
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.sources.is_empty() && self.errors.is_empty()
    }
}
