//! Gemini provider implementation
//!
//! Streams `streamGenerateContent` over Server-Sent Events and maps each event
//! to a [`GenerationChunk`]. Search grounding uses the `googleSearch` tool.
//! See: https://ai.google.dev/api/generate-content
//!
//! # Examples
//!
//! ```no_run
//! use futures::StreamExt;
//! use radar_llm::{GenerationProvider, GenerationRequest};
//! use radar_llm::providers::{GeminiConfig, GeminiProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GEMINI_API_KEY
//!     let provider = GeminiProvider::with_config(GeminiConfig::from_env()?)?;
//!
//!     let request = GenerationRequest::builder("gemini-2.5-flash")
//!         .prompt("How did Equinor trade today?")
//!         .web_search()
//!         .build();
//!
//!     let mut chunks = provider.stream(request).await?;
//!     while let Some(chunk) = chunks.next().await {
//!         if let Some(text) = chunk?.text {
//!             print!("{text}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```

use crate::{
    ChunkStream, FinishReason, GenerationChunk, GenerationProvider, GenerationRequest,
    GroundingMetadata, LLMError, Result, SseDecoder, TokenUsage, WebSource,
};
use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use radar_utils::{env_var, env_var_any};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Model used when the caller does not pick one
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Configuration for the Gemini provider
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key sent as `x-goog-api-key`
    pub api_key: String,

    /// Base URL including the API version
    pub api_base: String,

    /// Connect timeout in seconds
    ///
    /// There is no total request timeout: a grounded answer can stream for
    /// longer than any fixed bound. Idle limits belong to the consumer.
    pub connect_timeout_secs: u64,
}

impl GeminiConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }

    /// Create config from environment variables
    ///
    /// Reads the key from `GEMINI_API_KEY`, falling back to `API_KEY`.
    /// Optionally reads the base URL from `GEMINI_API_BASE`.
    pub fn from_env() -> Result<Self> {
        let api_key = env_var_any(&["GEMINI_API_KEY", "API_KEY"]).ok_or_else(|| {
            LLMError::ConfigurationError("GEMINI_API_KEY environment variable not set".to_string())
        })?;

        let config = Self::new(api_key);
        Ok(match env_var("GEMINI_API_BASE") {
            Some(api_base) => config.with_api_base(api_base),
            None => config,
        })
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set connect timeout in seconds
    pub fn with_connect_timeout(mut self, connect_timeout_secs: u64) -> Self {
        self.connect_timeout_secs = connect_timeout_secs;
        self
    }

    fn stream_url(&self, model: &str) -> String {
        format!(
            "{}/models/{model}:streamGenerateContent",
            self.api_base.trim_end_matches('/')
        )
    }
}

/// Gemini streaming provider
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a provider with custom configuration
    pub fn with_config(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    #[instrument(skip(self, request), fields(model = %request.model, grounded = request.uses_web_search()))]
    async fn stream(&self, request: GenerationRequest) -> Result<ChunkStream> {
        let url = self.config.stream_url(&request.model);
        debug!("Opening Gemini stream at {url}");

        let body = GeminiRequest::from(&request);

        let response = self
            .client
            .post(&url)
            .query(&[("alt", "sse")])
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = upstream_error_message(&error_text);
            warn!(status = status.as_u16(), "Gemini rejected the request: {message}");

            return Err(match status.as_u16() {
                400 => LLMError::InvalidRequest(message),
                401 | 403 => LLMError::AuthenticationFailed,
                404 => LLMError::ModelNotFound(request.model),
                429 => LLMError::RateLimitExceeded(message),
                _ => LLMError::RequestFailed(format!("HTTP {status}: {message}")),
            });
        }

        Ok(chunk_stream(response.bytes_stream()))
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

struct ChunkState<S> {
    body: Option<Pin<Box<S>>>,
    sse: SseDecoder,
    ready: VecDeque<Result<GenerationChunk>>,
}

/// Turn a raw SSE body from `streamGenerateContent` into chunks
///
/// The stream ends after the last event, or right after the first error:
/// a read failure, an unparseable event, or an error object sent by the
/// upstream inside the stream.
pub fn chunk_stream<S, B, E>(body: S) -> ChunkStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = ChunkState {
        body: Some(Box::pin(body)),
        sse: SseDecoder::new(),
        ready: VecDeque::new(),
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.ready.pop_front() {
                if item.is_err() {
                    state.body = None;
                    state.ready.clear();
                }
                return Some((item, state));
            }

            let body = state.body.as_mut()?;
            let next = body.next().await;

            match next {
                Some(Ok(bytes)) => {
                    for data in state.sse.push(bytes.as_ref()) {
                        state.ready.extend(parse_event(&data));
                    }
                }
                Some(Err(err)) => {
                    state.body = None;
                    state
                        .ready
                        .push_back(Err(LLMError::StreamInterrupted(err.to_string())));
                }
                None => {
                    state.body = None;
                    if let Some(data) = state.sse.finish() {
                        state.ready.extend(parse_event(&data));
                    }
                }
            }
        }
    }))
}

/// Parse one SSE data payload
///
/// Returns `None` for keep-alive payloads that carry nothing.
fn parse_event(data: &str) -> Option<Result<GenerationChunk>> {
    let data = data.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    let event: GeminiStreamEvent = match serde_json::from_str(data) {
        Ok(event) => event,
        Err(e) => {
            return Some(Err(LLMError::UnexpectedResponse(format!(
                "Failed to parse stream event: {e}"
            ))));
        }
    };

    if let Some(error) = event.error {
        return Some(Err(LLMError::ProviderError(error.message)));
    }

    Some(Ok(event.into_chunk()))
}

fn upstream_error_message(body: &str) -> String {
    serde_json::from_str::<GeminiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

fn map_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::MaxTokens,
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" => FinishReason::Safety,
        other => FinishReason::Other(other.to_string()),
    }
}

// ============================================================================
// Gemini-specific request types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
}

impl From<&GenerationRequest> for GeminiRequest {
    fn from(request: &GenerationRequest) -> Self {
        let tools = if request.uses_web_search() {
            vec![GeminiTool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };

        Self {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart::text(&request.prompt)],
            }],
            system_instruction: request.system.as_ref().map(|system| GeminiContent {
                role: None,
                parts: vec![GeminiPart::text(system)],
            }),
            tools,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

impl GeminiPart {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            thought: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

// ============================================================================
// Gemini-specific response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiStreamEvent {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    error: Option<GeminiErrorBody>,
}

impl GeminiStreamEvent {
    fn into_chunk(self) -> GenerationChunk {
        let usage = self.usage_metadata.map(|usage| TokenUsage {
            input_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count,
        });

        let Some(candidate) = self.candidates.into_iter().next() else {
            return GenerationChunk {
                usage,
                ..GenerationChunk::default()
            };
        };

        // Thought summaries are not part of the answer
        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter(|part| part.thought != Some(true))
            .filter_map(|part| part.text)
            .collect();

        GenerationChunk {
            text: (!text.is_empty()).then_some(text),
            grounding: candidate.grounding_metadata.map(GroundingMetadata::from),
            finish_reason: candidate.finish_reason.as_deref().map(map_finish_reason),
            usage,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
    grounding_metadata: Option<GeminiGrounding>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGrounding {
    #[serde(default)]
    web_search_queries: Vec<String>,
    #[serde(default)]
    grounding_chunks: Vec<GeminiGroundingChunk>,
}

impl From<GeminiGrounding> for GroundingMetadata {
    fn from(grounding: GeminiGrounding) -> Self {
        Self {
            web_sources: grounding
                .grounding_chunks
                .into_iter()
                .filter_map(|chunk| chunk.web)
                .map(|web| WebSource {
                    uri: web.uri,
                    title: web.title,
                })
                .collect(),
            search_queries: grounding.web_search_queries,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiGroundingChunk {
    web: Option<GeminiWeb>,
}

#[derive(Debug, Deserialize)]
struct GeminiWeb {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}
