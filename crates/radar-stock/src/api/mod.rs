//! API clients for stock data providers

pub mod alpha_vantage;

pub use alpha_vantage::{
    AlphaVantageClient, CompanyOverview, DailyBar, DailySeriesEnvelope, GlobalQuoteEnvelope,
    RawGlobalQuote, is_rate_limit_message,
};
