//! Quote lookup for invest-radar
//!
//! This crate fetches company, quote and price history data for one ticker
//! from Alpha Vantage and normalizes it into the shared wire types:
//!
//! - Typed response schemas for the three endpoints used
//! - A single fetch helper that classifies upstream error payloads
//! - [`QuoteAggregator`], which fans out the three calls and validates the result
//!
//! # Example
//!
//! ```rust,no_run
//! use radar_stock::{QuoteAggregator, StockConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StockConfig::from_env()?;
//!     let aggregator = QuoteAggregator::from_config(&config)?;
//!
//!     let snapshot = aggregator.lookup("EQNR.OL").await?;
//!     println!("{} trades at {}", snapshot.stock.name, snapshot.stock.price);
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod api;
pub mod config;
pub mod error;

// Re-export main types for convenience
pub use aggregator::QuoteAggregator;
pub use api::{AlphaVantageClient, is_rate_limit_message};
pub use config::StockConfig;
pub use error::{Result, StockError};
