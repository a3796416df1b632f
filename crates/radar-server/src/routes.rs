//! HTTP routes
//!
//! - `POST /api/analyze`: framed analysis stream
//! - `GET /api/stock?ticker=T`: quote and history
//! - `GET /health`: liveness

use crate::analysis::OpenError;
use crate::error::{ApiError, MISSING_STOCK_KEY_MESSAGE};
use crate::state::AppState;
use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{
        Query, State,
        rejection::{BytesRejection, QueryRejection},
    },
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use radar_core::StockSnapshot;
use radar_llm::GenerationRequest;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Returned when the generation key is missing
pub const MISSING_ANALYSIS_KEY_MESSAGE: &str = "API key is not configured on the server.";

/// Returned when the analyze body lacks a field
pub const MISSING_FIELDS_MESSAGE: &str = "Missing stockName or userQuery in request body.";

/// Returned when the generation session cannot be opened
pub const ANALYSIS_FAILURE_MESSAGE: &str =
    "An error occurred on the server while generating the analysis.";

/// Returned when the generation session does not open in time
pub const ANALYSIS_TIMEOUT_MESSAGE: &str =
    "The analysis service did not respond in time. Please try again.";

/// Returned when the ticker parameter is missing or blank
pub const MISSING_TICKER_MESSAGE: &str = "Ticker symbol is required.";

const STREAM_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Create the Axum router with all endpoints.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/analyze", post(analyze))
        .route("/api/stock", get(stock))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

/// Body of `POST /api/analyze`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub stock_name: Option<String>,
    pub user_query: Option<String>,
}

impl AnalyzeRequest {
    /// Both fields, trimmed, when both are present and non-blank
    fn fields(&self) -> Option<(&str, &str)> {
        let stock_name = self.stock_name.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let user_query = self.user_query.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((stock_name, user_query))
    }
}

/// Stream a grounded analysis.
///
/// The body is read as raw bytes so that a missing credential is reported
/// before the body is even looked at.
async fn analyze(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let Some(producer) = state.producer.as_ref() else {
        error!("Analysis requested but no generation key is configured");
        return Err(ApiError::internal(MISSING_ANALYSIS_KEY_MESSAGE));
    };

    let body = body.map_err(|rejection| {
        debug!(error = %rejection, "Analyze body rejected");
        ApiError::new(rejection.status(), rejection.body_text())
    })?;

    let request: AnalyzeRequest =
        serde_json::from_slice(&body).map_err(|_| ApiError::bad_request(MISSING_FIELDS_MESSAGE))?;
    let (stock_name, user_query) = request
        .fields()
        .ok_or_else(|| ApiError::bad_request(MISSING_FIELDS_MESSAGE))?;

    info!(stock_name, query_len = user_query.len(), "Starting analysis");

    let prompt = state.prompts.render(stock_name, user_query).map_err(|err| {
        error!(error = %err, "Failed to render analysis prompt");
        ApiError::internal(ANALYSIS_FAILURE_MESSAGE)
    })?;

    let generation = GenerationRequest::builder(state.model.as_str())
        .prompt(prompt)
        .system(state.prompts.persona())
        .web_search()
        .build();

    let frames = producer.open(generation).await.map_err(|err| match err {
        OpenError::Timeout(after) => {
            error!(?after, provider = producer.provider_name(), "Analysis upstream timed out");
            ApiError::gateway_timeout(ANALYSIS_TIMEOUT_MESSAGE)
        }
        OpenError::Provider(err) => {
            error!(error = %err, provider = producer.provider_name(), "Failed to open analysis stream");
            ApiError::internal(ANALYSIS_FAILURE_MESSAGE)
        }
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, STREAM_CONTENT_TYPE),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        Body::from_stream(frames),
    )
        .into_response())
}

/// Query of `GET /api/stock`
#[derive(Debug, Deserialize)]
pub struct StockQuery {
    pub ticker: Option<String>,
}

/// Look up quote and history for a ticker.
async fn stock(
    State(state): State<Arc<AppState>>,
    query: Result<Query<StockQuery>, QueryRejection>,
) -> Result<Json<StockSnapshot>, ApiError> {
    let Some(quotes) = state.quotes.as_ref() else {
        error!("Stock lookup requested but no quote key is configured");
        return Err(ApiError::internal(MISSING_STOCK_KEY_MESSAGE));
    };

    let Query(query) = query.map_err(|rejection| {
        debug!(error = %rejection, "Stock query rejected");
        ApiError::bad_request(MISSING_TICKER_MESSAGE)
    })?;

    let ticker = query
        .ticker
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request(MISSING_TICKER_MESSAGE))?;

    let snapshot = quotes
        .lookup(ticker)
        .await
        .map_err(|err| ApiError::from_stock_error(err, state.prompts.language()))?;

    Ok(Json(snapshot))
}
