//! Alpha Vantage API client

use crate::config::StockConfig;
use crate::error::{Result, StockError};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Keys Alpha Vantage uses to report a failed call with HTTP 200
const ERROR_KEYS: [&str; 3] = ["Error Message", "Information", "Note"];

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    api_base: String,
}

/// Company overview data
///
/// Only the fields the quote needs are kept. All are optional on the wire;
/// the aggregator decides which ones are required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompanyOverview {
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub exchange: Option<String>,
    pub currency: Option<String>,
    #[serde(rename = "MarketCapitalization")]
    pub market_cap: Option<String>,
}

/// Body of a `GLOBAL_QUOTE` call
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalQuoteEnvelope {
    #[serde(rename = "Global Quote")]
    pub quote: Option<RawGlobalQuote>,
}

/// Latest quote as Alpha Vantage reports it, every value a string
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawGlobalQuote {
    #[serde(rename = "01. symbol")]
    pub symbol: Option<String>,
    #[serde(rename = "05. price")]
    pub price: Option<String>,
    #[serde(rename = "06. volume")]
    pub volume: Option<String>,
    #[serde(rename = "07. latest trading day")]
    pub latest_trading_day: Option<String>,
    #[serde(rename = "08. previous close")]
    pub previous_close: Option<String>,
    #[serde(rename = "09. change")]
    pub change: Option<String>,
    #[serde(rename = "10. change percent")]
    pub change_percent: Option<String>,
}

impl RawGlobalQuote {
    /// Alpha Vantage answers unknown symbols with `"Global Quote": {}`
    pub fn is_empty(&self) -> bool {
        self.symbol.is_none()
            && self.price.is_none()
            && self.volume.is_none()
            && self.latest_trading_day.is_none()
            && self.previous_close.is_none()
            && self.change.is_none()
            && self.change_percent.is_none()
    }
}

/// Body of a `TIME_SERIES_DAILY` call
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailySeriesEnvelope {
    /// Bars keyed by `YYYY-MM-DD`
    #[serde(rename = "Time Series (Daily)")]
    pub series: Option<HashMap<String, DailyBar>>,
}

/// One daily bar
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DailyBar {
    #[serde(rename = "1. open")]
    pub open: Option<String>,
    #[serde(rename = "2. high")]
    pub high: Option<String>,
    #[serde(rename = "3. low")]
    pub low: Option<String>,
    #[serde(rename = "4. close")]
    pub close: Option<String>,
    #[serde(rename = "5. volume")]
    pub volume: Option<String>,
}

/// Returns true if an upstream message reports the request quota
///
/// Matching is case-insensitive on "call frequency".
pub fn is_rate_limit_message(message: &str) -> bool {
    message.to_lowercase().contains("call frequency")
}

impl AlphaVantageClient {
    /// Create a client from a validated configuration
    pub fn with_config(config: &StockConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_base: config.api_base.clone(),
        })
    }

    /// Get company overview data
    #[instrument(skip(self))]
    pub async fn get_company_overview(&self, symbol: &str) -> Result<CompanyOverview> {
        self.fetch("OVERVIEW", symbol, &[]).await
    }

    /// Get global quote (current price data)
    #[instrument(skip(self))]
    pub async fn get_quote(&self, symbol: &str) -> Result<GlobalQuoteEnvelope> {
        self.fetch("GLOBAL_QUOTE", symbol, &[]).await
    }

    /// Get the compact daily time series (about 100 trading days)
    #[instrument(skip(self))]
    pub async fn get_daily(&self, symbol: &str) -> Result<DailySeriesEnvelope> {
        self.fetch("TIME_SERIES_DAILY", symbol, &[("outputsize", "compact")])
            .await
    }

    /// Issue one query and decode its body
    ///
    /// Non-2xx statuses, error payloads and empty objects are errors.
    async fn fetch<T: DeserializeOwned>(
        &self,
        function: &str,
        symbol: &str,
        extra: &[(&str, &str)],
    ) -> Result<T> {
        let mut params: Vec<(&str, &str)> = vec![("function", function), ("symbol", symbol)];
        params.extend_from_slice(extra);
        params.push(("apikey", self.api_key.as_str()));

        let response = self
            .client
            .get(&self.api_base)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StockError::Upstream(format!(
                "API request failed with status {} for function {function}",
                status.as_u16()
            )));
        }

        let data: serde_json::Value = response.json().await?;
        check_payload(&data)?;
        debug!(function, "Alpha Vantage call succeeded");

        Ok(serde_json::from_value(data)?)
    }
}

fn check_payload(data: &serde_json::Value) -> Result<()> {
    let Some(object) = data.as_object() else {
        return Err(StockError::Upstream(
            "Expected a JSON object from the API".to_string(),
        ));
    };

    for key in ERROR_KEYS {
        if let Some(message) = object.get(key) {
            let message = message
                .as_str()
                .map_or_else(|| message.to_string(), str::to_string);
            warn!(key, message = %message, "Alpha Vantage reported an error");

            return Err(if is_rate_limit_message(&message) {
                StockError::RateLimited(message)
            } else {
                StockError::Upstream(message)
            });
        }
    }

    if object.is_empty() {
        return Err(StockError::Upstream(
            "Received an empty response from the API.".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> AlphaVantageClient {
        let config = StockConfig::builder()
            .api_key("demo")
            .api_base(format!("{}/query", server.uri()))
            .build()
            .unwrap();
        AlphaVantageClient::with_config(&config).unwrap()
    }

    #[test]
    fn test_rate_limit_detection() {
        assert!(is_rate_limit_message(
            "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute"
        ));
        assert!(is_rate_limit_message("API CALL FREQUENCY exceeded"));
        assert!(!is_rate_limit_message("Invalid API call. Please retry"));
    }

    #[test]
    fn test_check_payload() {
        assert!(check_payload(&json!({"Symbol": "EQNR"})).is_ok());
        assert!(matches!(
            check_payload(&json!({})),
            Err(StockError::Upstream(m)) if m.contains("empty response")
        ));
        assert!(matches!(
            check_payload(&json!({"Note": "Our standard API call frequency is 5 calls per minute"})),
            Err(StockError::RateLimited(_))
        ));
        assert!(matches!(
            check_payload(&json!({"Error Message": "Invalid API call"})),
            Err(StockError::Upstream(m)) if m == "Invalid API call"
        ));
        assert!(check_payload(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_empty_global_quote() {
        let envelope: GlobalQuoteEnvelope =
            serde_json::from_value(json!({"Global Quote": {}})).unwrap();
        assert!(envelope.quote.unwrap().is_empty());

        let envelope: GlobalQuoteEnvelope = serde_json::from_value(json!({"x": 1})).unwrap();
        assert!(envelope.quote.is_none());
    }

    #[tokio::test]
    async fn test_get_quote_sends_function_and_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("function", "GLOBAL_QUOTE"))
            .and(query_param("symbol", "EQNR.OL"))
            .and(query_param("apikey", "demo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Global Quote": {"01. symbol": "EQNR.OL", "05. price": "270.5000"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let envelope = client_for(&server).await.get_quote("EQNR.OL").await.unwrap();
        assert_eq!(envelope.quote.unwrap().price.as_deref(), Some("270.5000"));
    }

    #[tokio::test]
    async fn test_get_daily_requests_compact_output() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("function", "TIME_SERIES_DAILY"))
            .and(query_param("outputsize", "compact"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Time Series (Daily)": {"2024-10-01": {"4. close": "100.0"}}
            })))
            .mount(&server)
            .await;

        let envelope = client_for(&server).await.get_daily("DNB.OL").await.unwrap();
        let series = envelope.series.unwrap();
        assert_eq!(series["2024-10-01"].close.as_deref(), Some("100.0"));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = client_for(&server).await.get_company_overview("EQNR.OL").await;
        assert!(matches!(result, Err(StockError::Upstream(m)) if m.contains("503")));
    }

    #[tokio::test]
    async fn test_information_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Information": "Our standard API call frequency is 5 calls per minute and 100 calls per day."
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).await.get_company_overview("EQNR.OL").await;
        assert!(matches!(result, Err(StockError::RateLimited(_))));
    }
}
