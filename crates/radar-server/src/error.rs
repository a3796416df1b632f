//! HTTP error responses

use crate::language::Language;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use radar_stock::StockError;
use serde::Serialize;
use tracing::error;

/// Returned when the quote provider key is missing
pub const MISSING_STOCK_KEY_MESSAGE: &str =
    "Alpha Vantage API key is not configured on the server.";

/// Returned for quote lookups that fail for reasons the user cannot fix
pub const STOCK_FAILURE_MESSAGE: &str = "An unexpected error occurred while fetching stock data.";

/// JSON body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// API error carrying the status and the message shown to the caller
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Create a gateway timeout error.
    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, message)
    }

    /// Map a quote lookup failure to a response
    ///
    /// Upstream and transport details are logged and replaced by a generic
    /// message.
    pub fn from_stock_error(err: StockError, language: Language) -> Self {
        match err {
            StockError::Validation(message) => Self::bad_request(message),
            StockError::NotFound { .. } | StockError::IncompleteData { .. } => {
                Self::not_found(err.to_string())
            }
            StockError::RateLimited(detail) => {
                tracing::warn!(detail = %detail, "Quote provider rate limit reached");
                Self::new(StatusCode::TOO_MANY_REQUESTS, language.rate_limit_message())
            }
            StockError::Config(detail) => {
                error!(detail = %detail, "Quote provider misconfigured");
                Self::internal(MISSING_STOCK_KEY_MESSAGE)
            }
            other => {
                error!(error = %other, "Quote lookup failed");
                Self::internal(STOCK_FAILURE_MESSAGE)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_error_mapping() {
        let cases = [
            (
                StockError::Validation("empty".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                StockError::NotFound {
                    symbol: "X".to_string(),
                    message: "No quote data found for ticker 'X'.".to_string(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                StockError::IncompleteData {
                    symbol: "X".to_string(),
                    field: "price",
                },
                StatusCode::NOT_FOUND,
            ),
            (
                StockError::RateLimited("API call frequency".to_string()),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                StockError::Upstream("Invalid API call".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from_stock_error(err, Language::English).status(), status);
        }
    }

    #[test]
    fn test_upstream_details_are_hidden() {
        let err = ApiError::from_stock_error(
            StockError::Upstream("apikey=secret rejected".to_string()),
            Language::English,
        );
        assert_eq!(err.message(), STOCK_FAILURE_MESSAGE);
    }

    #[test]
    fn test_rate_limit_message_is_localized() {
        let err = ApiError::from_stock_error(
            StockError::RateLimited("call frequency".to_string()),
            Language::Norwegian,
        );
        assert_eq!(err.message(), Language::Norwegian.rate_limit_message());
    }
}
