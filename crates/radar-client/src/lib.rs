//! Client for the invest-radar HTTP API
//!
//! [`RadarClient`] wraps both endpoints. Quote lookups return a typed
//! [`StockSnapshot`](radar_core::StockSnapshot); analyses come back as a
//! stream of [`AnalysisEvent`](radar_core::AnalysisEvent)s decoded as the
//! bytes arrive.

pub mod client;
pub mod error;
pub mod ticker;

pub use client::{
    ANALYSIS_START_FAILURE_MESSAGE, CONNECT_FAILURE_MESSAGE, DEFAULT_SERVER_URL, EventStream,
    RadarClient,
};
pub use error::{ClientError, Result};
pub use ticker::{DEFAULT_MARKET_SUFFIX, TickerNormalizer, normalize_ticker};
