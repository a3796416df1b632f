//! Streaming analysis producer
//!
//! Opens one grounded generation session and re-encodes its chunks as framed
//! [`AnalysisEvent`]s. A spawned pump task is the only writer; it feeds a
//! bounded channel whose receiver becomes the HTTP response body.

use axum::body::Bytes;
use futures::StreamExt;
use radar_core::{AnalysisEvent, SourceRef, dedupe_sources, encode_frame};
use radar_llm::{ChunkStream, GenerationChunk, GenerationProvider, GenerationRequest, LLMError};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};

/// Error frame sent when the upstream fails after streaming started
pub const STREAM_FAILURE_MESSAGE: &str = "The analysis was interrupted by an upstream error.";

/// Error frame sent when the upstream stops sending for too long
pub const IDLE_TIMEOUT_MESSAGE: &str = "The analysis timed out waiting for the model.";

/// Body of a framed analysis response
pub type FrameStream = ReceiverStream<Result<Bytes, Infallible>>;

/// Failure to open the upstream session
#[derive(Debug, Error)]
pub enum OpenError {
    /// The upstream did not accept the request in time
    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    /// The upstream rejected the request
    #[error(transparent)]
    Provider(#[from] LLMError),
}

/// How a pump run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpOutcome {
    /// Upstream exhausted and every frame delivered
    Completed,
    /// Upstream failed mid-stream; an error frame was sent
    Failed,
    /// Upstream went quiet; an error frame was sent
    TimedOut,
    /// The response body was dropped
    Disconnected,
}

/// Limits applied to one analysis stream
#[derive(Debug, Clone, Copy)]
pub struct ProducerSettings {
    /// Bound on opening the upstream session
    pub open_timeout: Duration,
    /// Longest gap allowed between two upstream chunks
    pub idle_timeout: Duration,
    /// Frames buffered before the pump waits for the client
    pub channel_capacity: usize,
}

impl Default for ProducerSettings {
    fn default() -> Self {
        Self {
            open_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(60),
            channel_capacity: 16,
        }
    }
}

/// Turns generation sessions into framed byte streams
#[derive(Clone)]
pub struct AnalysisProducer {
    provider: Arc<dyn GenerationProvider>,
    settings: ProducerSettings,
}

impl AnalysisProducer {
    pub fn new(provider: Arc<dyn GenerationProvider>, settings: ProducerSettings) -> Self {
        Self { provider, settings }
    }

    /// Name of the underlying provider
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Open the upstream session and start pumping frames
    ///
    /// Errors here happen before any byte is written, so the caller can still
    /// answer with a plain status code.
    pub async fn open(&self, request: GenerationRequest) -> Result<FrameStream, OpenError> {
        let open_timeout = self.settings.open_timeout;
        let chunks = tokio::time::timeout(open_timeout, self.provider.stream(request))
            .await
            .map_err(|_| OpenError::Timeout(open_timeout))??;

        let (tx, rx) = mpsc::channel(self.settings.channel_capacity.max(1));
        let idle_timeout = self.settings.idle_timeout;

        tokio::spawn(async move {
            let outcome = pump(chunks, tx, idle_timeout).await;
            debug!(?outcome, "Analysis pump finished");
        });

        Ok(ReceiverStream::new(rx))
    }
}

/// Forward upstream chunks as frames until the stream ends
///
/// Only the last chunk is kept: its grounding metadata is the complete
/// citation list for the turn.
pub async fn pump(
    mut chunks: ChunkStream,
    tx: mpsc::Sender<Result<Bytes, Infallible>>,
    idle_timeout: Duration,
) -> PumpOutcome {
    let mut last: Option<GenerationChunk> = None;
    let mut text_frames = 0usize;

    loop {
        let next = tokio::select! {
            () = tx.closed() => {
                info!(text_frames, "Client disconnected, cancelling analysis");
                return PumpOutcome::Disconnected;
            }
            next = tokio::time::timeout(idle_timeout, chunks.next()) => next,
        };

        match next {
            Ok(Some(Ok(chunk))) => {
                if let Some(text) = chunk.text.as_deref().filter(|text| !text.is_empty()) {
                    if !send(&tx, &AnalysisEvent::text(text)).await {
                        return PumpOutcome::Disconnected;
                    }
                    text_frames += 1;
                }
                last = Some(chunk);
            }
            Ok(Some(Err(err))) => {
                error!(error = %err, text_frames, "Upstream failed mid-stream");
                send(&tx, &AnalysisEvent::error(STREAM_FAILURE_MESSAGE)).await;
                return PumpOutcome::Failed;
            }
            Ok(None) => break,
            Err(_) => {
                warn!(?idle_timeout, text_frames, "Upstream went idle");
                send(&tx, &AnalysisEvent::error(IDLE_TIMEOUT_MESSAGE)).await;
                return PumpOutcome::TimedOut;
            }
        }
    }

    let sources = last.map(|chunk| sources_from(&chunk)).unwrap_or_default();
    info!(text_frames, sources = sources.len(), "Analysis stream complete");

    if !sources.is_empty() && !send(&tx, &AnalysisEvent::sources(sources)).await {
        return PumpOutcome::Disconnected;
    }

    PumpOutcome::Completed
}

/// Citations carried by a chunk, cleaned and deduplicated
pub fn sources_from(chunk: &GenerationChunk) -> Vec<SourceRef> {
    let Some(grounding) = &chunk.grounding else {
        return Vec::new();
    };

    dedupe_sources(
        grounding
            .web_sources
            .iter()
            .filter_map(|web| SourceRef::from_parts(web.uri.as_deref(), web.title.as_deref())),
    )
}

/// Encode and send one frame, returning false once the receiver is gone
async fn send(tx: &mpsc::Sender<Result<Bytes, Infallible>>, event: &AnalysisEvent) -> bool {
    let frame = match encode_frame(event) {
        Ok(frame) => frame,
        Err(err) => {
            error!(error = %err, "Failed to encode frame");
            return true;
        }
    };

    tx.send(Ok(Bytes::from(frame))).await.is_ok()
}
