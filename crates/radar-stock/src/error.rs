//! Error types for quote lookup

use thiserror::Error;

/// Quote lookup specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// Missing or invalid configuration, such as an absent API key
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller supplied unusable input
    #[error("Invalid symbol: {0}")]
    Validation(String),

    /// The upstream has no data for the symbol
    #[error("{message}")]
    NotFound { symbol: String, message: String },

    /// A required field was missing, unparseable or not finite
    #[error("Incomplete data for {symbol}: missing or invalid {field}")]
    IncompleteData { symbol: String, field: &'static str },

    /// The upstream refused the call because of its request quota
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// The upstream reported an error or answered with an unusable payload
    #[error("Alpha Vantage error: {0}")]
    Upstream(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StockError {
    pub(crate) fn incomplete(symbol: &str, field: &'static str) -> Self {
        Self::IncompleteData {
            symbol: symbol.to_string(),
            field,
        }
    }

    /// Returns true when the caller should be told the symbol has no data
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::IncompleteData { .. })
    }
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;
