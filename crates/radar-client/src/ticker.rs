//! Ticker normalization
//!
//! Users type bare symbols like `eqnr`; the quote provider expects the
//! exchange-qualified form `EQNR.OL`.

use radar_utils::env_var;

/// Oslo Børs suffix
pub const DEFAULT_MARKET_SUFFIX: &str = ".OL";

/// Normalize a ticker with the default market suffix
///
/// ```
/// use radar_client::normalize_ticker;
///
/// assert_eq!(normalize_ticker(" eqnr "), "EQNR.OL");
/// assert_eq!(normalize_ticker("dnb.ol"), "DNB.OL");
/// ```
pub fn normalize_ticker(input: &str) -> String {
    TickerNormalizer::default().normalize(input)
}

/// Appends a market suffix to bare tickers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerNormalizer {
    suffix: String,
}

impl Default for TickerNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MARKET_SUFFIX)
    }
}

impl TickerNormalizer {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into().trim().to_uppercase(),
        }
    }

    /// Read the suffix from `RADAR_MARKET_SUFFIX`, falling back to `.OL`
    pub fn from_env() -> Self {
        env_var("RADAR_MARKET_SUFFIX").map_or_else(Self::default, Self::new)
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Trim, uppercase and append the suffix unless it is already there
    ///
    /// Blank input stays blank so the server can reject it.
    pub fn normalize(&self, input: &str) -> String {
        let ticker = input.trim().to_uppercase();
        if ticker.is_empty() || self.suffix.is_empty() || ticker.ends_with(&self.suffix) {
            return ticker;
        }
        format!("{ticker}{}", self.suffix)
    }
}
