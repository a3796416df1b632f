//! Generation provider abstraction layer for invest-radar
//!
//! This crate provides provider-agnostic abstractions for streaming text
//! generation with search grounding. It includes:
//!
//! - Generation request and chunk types
//! - Grounding metadata carried by chunks
//! - Provider trait for streaming implementations
//! - An incremental Server-Sent Events decoder
//! - Concrete provider implementations (behind feature flags)

pub mod error;
pub mod generation;
pub mod provider;
pub mod sse;

// Re-export main types
pub use error::{LLMError, Result};
pub use generation::{
    FinishReason, GenerationChunk, GenerationRequest, GenerationTool, GroundingMetadata,
    TokenUsage, WebSource,
};
pub use provider::{ChunkStream, GenerationProvider};
pub use sse::SseDecoder;

// Provider implementations (feature-gated)
#[cfg(feature = "gemini")]
pub mod providers;
