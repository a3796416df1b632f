//! Shared application state

use crate::analysis::{AnalysisProducer, ProducerSettings, PromptSet};
use crate::config::ServerConfig;
use radar_llm::GenerationProvider;
use radar_llm::providers::GeminiProvider;
use radar_stock::QuoteAggregator;
use std::sync::Arc;
use tracing::info;

/// Immutable state shared by all handlers
pub struct AppState {
    /// Analysis producer, absent when no generation key is configured
    pub producer: Option<AnalysisProducer>,

    /// Quote aggregator, absent when no quote key is configured
    pub quotes: Option<QuoteAggregator>,

    /// Prompt templates in the configured language
    pub prompts: PromptSet,

    /// Model used for analysis
    pub model: String,
}

impl AppState {
    /// Build the state from a loaded configuration
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Arc<Self>> {
        let settings = ProducerSettings {
            open_timeout: config.upstream_timeout,
            idle_timeout: config.stream_idle_timeout,
            ..ProducerSettings::default()
        };

        let producer = match &config.gemini {
            Some(gemini) => {
                let provider: Arc<dyn GenerationProvider> =
                    Arc::new(GeminiProvider::with_config(gemini.clone())?);
                info!(provider = provider.name(), model = %config.model, "Analysis enabled");
                Some(AnalysisProducer::new(provider, settings))
            }
            None => None,
        };

        let quotes = config
            .stock
            .as_ref()
            .map(QuoteAggregator::from_config)
            .transpose()?;

        Ok(Arc::new(Self {
            producer,
            quotes,
            prompts: PromptSet::new(config.language)?,
            model: config.model.clone(),
        }))
    }
}
