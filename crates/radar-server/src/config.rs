//! Server configuration
//!
//! Read once at startup. Handlers only see what ends up in
//! [`AppState`](crate::state::AppState).

use crate::language::Language;
use radar_llm::providers::{DEFAULT_GEMINI_MODEL, GeminiConfig};
use radar_stock::StockConfig;
use radar_utils::{env_duration_secs, env_parse, env_var};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::warn;

/// Address used when `RADAR_BIND` is not set
pub const DEFAULT_BIND: &str = "127.0.0.1:8888";

/// Configuration for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address
    pub bind: SocketAddr,

    /// Generation provider settings; `None` when no key is configured
    pub gemini: Option<GeminiConfig>,

    /// Model used for analysis
    pub model: String,

    /// Quote provider settings; `None` when no key is configured
    pub stock: Option<StockConfig>,

    /// Prompt and message language
    pub language: Language,

    /// Bound on opening the generation session
    pub upstream_timeout: Duration,

    /// Longest gap allowed between two generation chunks
    pub stream_idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8888)),
            gemini: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            stock: None,
            language: Language::default(),
            upstream_timeout: Duration::from_secs(30),
            stream_idle_timeout: Duration::from_secs(60),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the environment
    ///
    /// Missing API keys are not fatal here: the server starts and the
    /// affected endpoint answers with a configuration error.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let gemini = match GeminiConfig::from_env() {
            Ok(config) => Some(config),
            Err(err) => {
                warn!(error = %err, "Analysis endpoint disabled");
                None
            }
        };

        let stock = match StockConfig::from_env() {
            Ok(config) => Some(config),
            Err(err) => {
                warn!(error = %err, "Stock endpoint disabled");
                None
            }
        };

        Self {
            bind: env_parse("RADAR_BIND", defaults.bind),
            gemini,
            model: env_var("GEMINI_MODEL").unwrap_or(defaults.model),
            stock,
            language: env_parse("RADAR_LANGUAGE", defaults.language),
            upstream_timeout: env_duration_secs(
                "RADAR_UPSTREAM_TIMEOUT_SECS",
                defaults.upstream_timeout,
            ),
            stream_idle_timeout: env_duration_secs(
                "RADAR_STREAM_IDLE_TIMEOUT_SECS",
                defaults.stream_idle_timeout,
            ),
        }
    }
}
