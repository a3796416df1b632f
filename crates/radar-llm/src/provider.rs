//! Generation provider trait definition

use crate::{GenerationChunk, GenerationRequest, Result};
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Ordered stream of chunks from one generation session
///
/// The stream ends after the final chunk or after the first error.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<GenerationChunk>> + Send>>;

/// Trait for streaming generation providers
///
/// Implementations open one upstream session per call. Dropping the returned
/// stream must abort the session.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Open a generation session and stream its chunks
    ///
    /// # Arguments
    ///
    /// * `request` - Prompt, persona and tool configuration
    ///
    /// # Returns
    ///
    /// A chunk stream once the upstream accepted the request. Failures that
    /// happen before the first byte of the body are returned here.
    async fn stream(&self, request: GenerationRequest) -> Result<ChunkStream>;

    /// Get the provider name (e.g., "gemini")
    fn name(&self) -> &str;
}
