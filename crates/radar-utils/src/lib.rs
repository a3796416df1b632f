//! Shared utilities for invest-radar
//!
//! This crate provides common functionality used across the invest-radar workspace,
//! including logging setup and environment-driven configuration helpers.

pub mod config;
pub mod logging;

pub use config::{env_duration_secs, env_parse, env_var, env_var_any};
pub use logging::{LogFormat, init_tracing, init_tracing_with};
