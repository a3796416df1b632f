//! Client error types

use thiserror::Error;

/// Result type for client calls
pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered with a non-success status
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),
}
