//! HTTP client for the invest-radar server

use crate::error::{ClientError, Result};
use futures::stream::{self, BoxStream, StreamExt};
use radar_core::{AnalysisEvent, StockSnapshot, decode_stream};
use radar_utils::env_var;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Server used when `RADAR_SERVER_URL` is not set
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8888";

/// Yielded when the analysis endpoint rejects the request without a message
pub const ANALYSIS_START_FAILURE_MESSAGE: &str = "Failed to start analysis stream.";

/// Yielded when the analysis request never reaches the server
pub const CONNECT_FAILURE_MESSAGE: &str = "Could not reach the analysis server.";

/// Analysis events in arrival order
pub type EventStream = BoxStream<'static, AnalysisEvent>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    stock_name: &'a str,
    user_query: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Client for the quote and analysis endpoints
#[derive(Debug, Clone)]
pub struct RadarClient {
    http: Client,
    base_url: Url,
}

impl RadarClient {
    /// Create a client for the server at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        // No overall timeout: an analysis stream may run for minutes
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Create a client for `RADAR_SERVER_URL`, or the local default
    pub fn from_env() -> Result<Self> {
        let base_url = env_var("RADAR_SERVER_URL").unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        Self::new(&base_url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))
    }

    /// Look up quote data and price history for `ticker`
    ///
    /// The ticker is sent as given; see [`normalize_ticker`](crate::normalize_ticker).
    #[instrument(skip(self))]
    pub async fn fetch_stock(&self, ticker: &str) -> Result<StockSnapshot> {
        let url = self.endpoint("api/stock")?;
        let response = self
            .http
            .get(url)
            .query(&[("ticker", ticker)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body).unwrap_or_else(|| {
                format!("Failed to fetch stock data with status {}", status.as_u16())
            });
            debug!(status = status.as_u16(), message = %message, "Stock lookup rejected");
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<StockSnapshot>().await?)
    }

    /// Request an analysis and stream its events
    ///
    /// Failures never surface as `Err`: a failed request or a rejected
    /// stream yields a single error event and ends. Dropping the returned
    /// stream closes the connection.
    #[instrument(skip(self, user_query))]
    pub async fn analyze(&self, stock_name: &str, user_query: &str) -> EventStream {
        let url = match self.endpoint("api/analyze") {
            Ok(url) => url,
            Err(err) => {
                warn!(error = %err, "Invalid analysis endpoint");
                return single(AnalysisEvent::error(CONNECT_FAILURE_MESSAGE));
            }
        };

        let request = AnalyzeRequest {
            stock_name,
            user_query,
        };

        let response = match self.http.post(url).json(&request).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "Analysis request failed");
                return single(AnalysisEvent::error(CONNECT_FAILURE_MESSAGE));
            }
        };

        let status = response.status();
        if !status.is_success() {
            return single(AnalysisEvent::error(start_failure(status, response).await));
        }

        decode_stream(response.bytes_stream()).boxed()
    }
}

async fn start_failure(status: StatusCode, response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), "Analysis stream rejected");
    error_message(&body).unwrap_or_else(|| ANALYSIS_START_FAILURE_MESSAGE.to_string())
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()?
        .error
        .filter(|message| !message.is_empty())
}

fn single(event: AnalysisEvent) -> EventStream {
    stream::iter([event]).boxed()
}
