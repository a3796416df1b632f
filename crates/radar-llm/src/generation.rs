//! Generation request and chunk types

use serde::{Deserialize, Serialize};

/// Request for one streamed, single-turn generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model identifier (provider-specific)
    pub model: String,

    /// User prompt
    pub prompt: String,

    /// Optional system instruction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Capabilities the model may use while answering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<GenerationTool>,
}

/// Capability offered to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationTool {
    /// Ground answers in live web search results
    WebSearch,
}

/// One incremental piece of a streamed generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationChunk {
    /// Text produced since the previous chunk
    pub text: Option<String>,

    /// Grounding metadata, typically only complete on the final chunk
    pub grounding: Option<GroundingMetadata>,

    /// Set on the chunk that ends the generation
    pub finish_reason: Option<FinishReason>,

    /// Token usage reported so far
    pub usage: Option<TokenUsage>,
}

impl GenerationChunk {
    /// Create a chunk carrying only text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Attach grounding metadata
    pub fn with_grounding(mut self, grounding: GroundingMetadata) -> Self {
        self.grounding = Some(grounding);
        self
    }

    /// Attach a finish reason
    pub fn with_finish_reason(mut self, reason: FinishReason) -> Self {
        self.finish_reason = Some(reason);
        self
    }
}

/// Citations attached by a search-grounded model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundingMetadata {
    /// Web pages backing the answer, in upstream order, possibly repeated
    pub web_sources: Vec<WebSource>,

    /// Search queries the model issued
    pub search_queries: Vec<String>,
}

/// Web page referenced in grounding metadata
///
/// Both fields come straight from the upstream and may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSource {
    pub uri: Option<String>,
    pub title: Option<String>,
}

impl WebSource {
    /// Create a web source with both fields set
    pub fn new(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            title: Some(title.into()),
        }
    }
}

/// Reason the model stopped generating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural completion
    Stop,

    /// Hit max tokens limit
    MaxTokens,

    /// Blocked by safety filters
    Safety,

    /// Any other provider-specific reason
    Other(String),
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens
    pub input_tokens: usize,

    /// Number of output tokens
    pub output_tokens: usize,
}

impl TokenUsage {
    /// Total tokens used (input + output)
    pub fn total(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

impl GenerationRequest {
    /// Create a builder for generation requests
    pub fn builder(model: impl Into<String>) -> GenerationRequestBuilder {
        GenerationRequestBuilder::new(model)
    }

    /// Returns true if web search grounding was requested
    pub fn uses_web_search(&self) -> bool {
        self.tools.contains(&GenerationTool::WebSearch)
    }
}

/// Builder for GenerationRequest
pub struct GenerationRequestBuilder {
    model: String,
    prompt: String,
    system: Option<String>,
    tools: Vec<GenerationTool>,
}

impl GenerationRequestBuilder {
    /// Create a new builder
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: String::new(),
            system: None,
            tools: Vec::new(),
        }
    }

    /// Set the user prompt
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Set the system instruction
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Enable web search grounding
    pub fn web_search(mut self) -> Self {
        if !self.tools.contains(&GenerationTool::WebSearch) {
            self.tools.push(GenerationTool::WebSearch);
        }
        self
    }

    /// Build the generation request
    pub fn build(self) -> GenerationRequest {
        GenerationRequest {
            model: self.model,
            prompt: self.prompt,
            system: self.system,
            tools: self.tools,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let request = GenerationRequest::builder("gemini-2.5-flash")
            .prompt("Analyze Equinor")
            .system("You are neutral")
            .web_search()
            .web_search()
            .build();

        assert_eq!(request.model, "gemini-2.5-flash");
        assert_eq!(request.prompt, "Analyze Equinor");
        assert_eq!(request.system.as_deref(), Some("You are neutral"));
        assert_eq!(request.tools, vec![GenerationTool::WebSearch]);
        assert!(request.uses_web_search());
    }

    #[test]
    fn test_chunk_helpers() {
        let chunk = GenerationChunk::text("hi")
            .with_grounding(GroundingMetadata {
                web_sources: vec![WebSource::new("https://a", "A")],
                search_queries: vec![],
            })
            .with_finish_reason(FinishReason::Stop);

        assert_eq!(chunk.text.as_deref(), Some("hi"));
        assert_eq!(chunk.grounding.unwrap().web_sources.len(), 1);
        assert_eq!(chunk.finish_reason, Some(FinishReason::Stop));
    }

    #[test]
    fn test_token_usage() {
        let usage = TokenUsage {
            input_tokens: 100,
            output_tokens: 50,
        };
        assert_eq!(usage.total(), 150);
    }
}
