//! HTTP server for invest-radar
//!
//! Serves two endpoints on top of the shared crates:
//!
//! - `POST /api/analyze` streams a search-grounded analysis as framed
//!   [`radar_core::AnalysisEvent`]s
//! - `GET /api/stock` returns a [`radar_core::StockSnapshot`]
//!
//! Configuration is read once by [`ServerConfig::from_env`]; handlers only
//! see the immutable [`AppState`].

pub mod analysis;
pub mod config;
pub mod error;
pub mod language;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use language::Language;
pub use routes::create_router;
pub use state::AppState;
