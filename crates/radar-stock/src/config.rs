//! Configuration for quote lookup

use crate::error::{Result, StockError};
use radar_utils::{env_duration_secs, env_var, env_var_any};
use std::time::Duration;

/// Default Alpha Vantage query endpoint
pub const DEFAULT_API_BASE: &str = "https://www.alphavantage.co/query";

/// Currency reported when the company overview has none
pub const DEFAULT_CURRENCY: &str = "NOK";

/// Configuration for the Alpha Vantage client and the aggregator
#[derive(Debug, Clone)]
pub struct StockConfig {
    /// Alpha Vantage API key
    pub api_key: String,

    /// Query endpoint, overridable for tests and proxies
    pub api_base: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Currency used when the upstream omits one
    pub default_currency: String,
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Load configuration from the environment
    ///
    /// Reads `ALPHA_VANTAGE_API_KEY` (or `ALPHAVANTAGE_API_KEY`),
    /// `ALPHA_VANTAGE_API_BASE` and `ALPHA_VANTAGE_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder().request_timeout(env_duration_secs(
            "ALPHA_VANTAGE_TIMEOUT_SECS",
            StockConfigBuilder::DEFAULT_TIMEOUT,
        ));

        if let Some(key) = env_var_any(&["ALPHA_VANTAGE_API_KEY", "ALPHAVANTAGE_API_KEY"]) {
            builder = builder.api_key(key);
        }
        if let Some(base) = env_var("ALPHA_VANTAGE_API_BASE") {
            builder = builder.api_base(base);
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(StockError::Config(
                "Alpha Vantage API key is not configured".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(StockError::Config(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    api_key: Option<String>,
    api_base: Option<String>,
    request_timeout: Option<Duration>,
    default_currency: Option<String>,
}

impl StockConfigBuilder {
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Set the Alpha Vantage API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the query endpoint
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the fallback currency
    pub fn default_currency(mut self, currency: impl Into<String>) -> Self {
        self.default_currency = Some(currency.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let config = StockConfig {
            api_key: self.api_key.unwrap_or_default(),
            api_base: self.api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            request_timeout: self.request_timeout.unwrap_or(Self::DEFAULT_TIMEOUT),
            default_currency: self
                .default_currency
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = StockConfig::builder().api_key("demo").build().unwrap();

        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.default_currency, "NOK");
    }

    #[test]
    fn test_builder_overrides() {
        let config = StockConfig::builder()
            .api_key("demo")
            .api_base("http://localhost:9999/query")
            .request_timeout(Duration::from_secs(5))
            .default_currency("SEK")
            .build()
            .unwrap();

        assert_eq!(config.api_base, "http://localhost:9999/query");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.default_currency, "SEK");
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let result = StockConfig::builder().build();
        assert!(matches!(result, Err(StockError::Config(_))));

        let result = StockConfig::builder().api_key("  ").build();
        assert!(matches!(result, Err(StockError::Config(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = StockConfig::builder()
            .api_key("demo")
            .request_timeout(Duration::ZERO)
            .build();
        assert!(result.is_err());
    }
}
