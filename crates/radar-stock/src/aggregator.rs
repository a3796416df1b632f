//! Quote aggregation
//!
//! One lookup fans out to three Alpha Vantage endpoints and folds the answers
//! into a [`StockSnapshot`]. Every number in the result is finite: a missing or
//! garbled upstream value fails the lookup instead of showing up as zero.

use crate::api::{AlphaVantageClient, CompanyOverview, DailyBar, RawGlobalQuote};
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use chrono::NaiveDate;
use radar_core::{PriceDataPoint, Stock, StockSnapshot};
use std::collections::HashMap;
use tracing::{info, instrument};

const SERIES_DATE_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_DATE_FORMAT: &str = "%d %b";

/// Builds quote snapshots from Alpha Vantage
#[derive(Debug, Clone)]
pub struct QuoteAggregator {
    client: AlphaVantageClient,
    default_currency: String,
}

impl QuoteAggregator {
    /// Create an aggregator around an existing client
    pub fn new(client: AlphaVantageClient, default_currency: impl Into<String>) -> Self {
        Self {
            client,
            default_currency: default_currency.into(),
        }
    }

    /// Create an aggregator from configuration
    pub fn from_config(config: &StockConfig) -> Result<Self> {
        let client = AlphaVantageClient::with_config(config)?;
        Ok(Self::new(client, config.default_currency.clone()))
    }

    /// Look up quote and history for one ticker
    ///
    /// The three upstream calls run concurrently and the first failure wins.
    #[instrument(skip(self))]
    pub async fn lookup(&self, ticker: &str) -> Result<StockSnapshot> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(StockError::Validation("ticker is empty".to_string()));
        }

        let (overview, quote, daily) = tokio::try_join!(
            self.client.get_company_overview(ticker),
            self.client.get_quote(ticker),
            self.client.get_daily(ticker),
        )?;

        let quote = quote
            .quote
            .filter(|quote| !quote.is_empty())
            .ok_or_else(|| StockError::NotFound {
                symbol: ticker.to_string(),
                message: format!(
                    "No quote data found for ticker '{ticker}'. It might be an invalid symbol."
                ),
            })?;

        let stock = build_stock(ticker, &overview, &quote, &self.default_currency)?;

        let series = daily.series.ok_or_else(|| StockError::NotFound {
            symbol: ticker.to_string(),
            message: format!("Could not fetch historical data for '{ticker}'."),
        })?;
        let history = build_history(ticker, series)?;

        info!(
            ticker = %stock.ticker,
            price = stock.price,
            history_len = history.len(),
            "Quote lookup complete"
        );

        Ok(StockSnapshot { stock, history })
    }
}

fn build_stock(
    ticker: &str,
    overview: &CompanyOverview,
    quote: &RawGlobalQuote,
    default_currency: &str,
) -> Result<Stock> {
    let name = non_empty(overview.name.as_deref())
        .ok_or_else(|| StockError::incomplete(ticker, "name"))?;

    let change_percent = quote
        .change_percent
        .as_deref()
        .map(|raw| raw.trim().trim_end_matches('%'));

    Ok(Stock {
        ticker: non_empty(overview.symbol.as_deref())
            .unwrap_or(ticker)
            .to_string(),
        name: name.to_string(),
        price: parse_finite(ticker, "price", quote.price.as_deref())?,
        change: parse_finite(ticker, "change", quote.change.as_deref())?,
        change_percent: parse_finite(ticker, "changePercent", change_percent)?,
        market_cap: parse_count(ticker, "marketCap", overview.market_cap.as_deref())?,
        volume: parse_count(ticker, "volume", quote.volume.as_deref())?,
        currency: non_empty(overview.currency.as_deref())
            .unwrap_or(default_currency)
            .to_string(),
    })
}

/// Order the daily series oldest first and label each point for display
fn build_history(ticker: &str, series: HashMap<String, DailyBar>) -> Result<Vec<PriceDataPoint>> {
    let mut points = series
        .into_iter()
        .map(|(day, bar)| {
            let date = NaiveDate::parse_from_str(day.trim(), SERIES_DATE_FORMAT)
                .map_err(|_| StockError::incomplete(ticker, "date"))?;
            let price = parse_finite(ticker, "close", bar.close.as_deref())?;
            Ok((date, price))
        })
        .collect::<Result<Vec<(NaiveDate, f64)>>>()?;

    points.sort_by_key(|(date, _)| *date);

    Ok(points
        .into_iter()
        .map(|(date, price)| PriceDataPoint {
            date: date.format(DISPLAY_DATE_FORMAT).to_string(),
            price,
        })
        .collect())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_finite(ticker: &str, field: &'static str, raw: Option<&str>) -> Result<f64> {
    non_empty(raw)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| StockError::incomplete(ticker, field))
}

/// Parse a non-negative integer count such as volume or market cap
fn parse_count(ticker: &str, field: &'static str, raw: Option<&str>) -> Result<u64> {
    let raw = non_empty(raw).ok_or_else(|| StockError::incomplete(ticker, field))?;

    if let Ok(count) = raw.parse::<u64>() {
        return Ok(count);
    }

    // Some listings report counts with a fractional part
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.trunc() as u64)
        .ok_or_else(|| StockError::incomplete(ticker, field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn overview() -> Value {
        json!({
            "Symbol": "EQNR.OL",
            "Name": "Equinor ASA",
            "Exchange": "OSL",
            "Currency": "NOK",
            "MarketCapitalization": "790000000000"
        })
    }

    fn quote() -> Value {
        json!({
            "Global Quote": {
                "01. symbol": "EQNR.OL",
                "05. price": "270.5000",
                "06. volume": "4123456",
                "07. latest trading day": "2024-10-03",
                "08. previous close": "268.0000",
                "09. change": "2.5000",
                "10. change percent": "0.9328%"
            }
        })
    }

    fn daily() -> Value {
        // Newest first, the way Alpha Vantage sends it
        json!({
            "Meta Data": {"2. Symbol": "EQNR.OL"},
            "Time Series (Daily)": {
                "2024-10-03": {"1. open": "268.0", "4. close": "270.5"},
                "2024-10-02": {"1. open": "266.0", "4. close": "268.0"},
                "2024-10-01": {"1. open": "265.0", "4. close": "266.1"}
            }
        })
    }

    async fn mount(server: &MockServer, function: &str, body: Value) {
        Mock::given(method("GET"))
            .and(query_param("function", function))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    async fn aggregator_with(overview: Value, quote: Value, daily: Value) -> (MockServer, QuoteAggregator) {
        let server = MockServer::start().await;
        mount(&server, "OVERVIEW", overview).await;
        mount(&server, "GLOBAL_QUOTE", quote).await;
        mount(&server, "TIME_SERIES_DAILY", daily).await;

        let config = StockConfig::builder()
            .api_key("demo")
            .api_base(format!("{}/query", server.uri()))
            .build()
            .unwrap();
        let aggregator = QuoteAggregator::from_config(&config).unwrap();
        (server, aggregator)
    }

    #[tokio::test]
    async fn test_lookup_builds_snapshot() {
        let (_server, aggregator) = aggregator_with(overview(), quote(), daily()).await;

        let snapshot = aggregator.lookup("EQNR.OL").await.unwrap();

        assert_eq!(snapshot.stock.ticker, "EQNR.OL");
        assert_eq!(snapshot.stock.name, "Equinor ASA");
        assert_eq!(snapshot.stock.price, 270.5);
        assert_eq!(snapshot.stock.change, 2.5);
        assert_eq!(snapshot.stock.change_percent, 0.9328);
        assert_eq!(snapshot.stock.market_cap, 790_000_000_000);
        assert_eq!(snapshot.stock.volume, 4_123_456);
        assert_eq!(snapshot.stock.currency, "NOK");
    }

    #[tokio::test]
    async fn test_history_is_oldest_first() {
        let (_server, aggregator) = aggregator_with(overview(), quote(), daily()).await;

        let history = aggregator.lookup("EQNR.OL").await.unwrap().history;
        let dates: Vec<&str> = history.iter().map(|p| p.date.as_str()).collect();
        let prices: Vec<f64> = history.iter().map(|p| p.price).collect();

        assert_eq!(dates, vec!["01 Oct", "02 Oct", "03 Oct"]);
        assert_eq!(prices, vec![266.1, 268.0, 270.5]);
    }

    #[tokio::test]
    async fn test_empty_global_quote_is_not_found() {
        let (_server, aggregator) =
            aggregator_with(overview(), json!({"Global Quote": {}}), daily()).await;

        let err = aggregator.lookup("NOPE.OL").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "No quote data found for ticker 'NOPE.OL'. It might be an invalid symbol."
        );
    }

    #[tokio::test]
    async fn test_missing_series_is_not_found() {
        let (_server, aggregator) =
            aggregator_with(overview(), quote(), json!({"Meta Data": {}})).await;

        let err = aggregator.lookup("EQNR.OL").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not fetch historical data for 'EQNR.OL'."
        );
    }

    #[tokio::test]
    async fn test_missing_currency_defaults_to_nok() {
        let mut overview = overview();
        overview.as_object_mut().unwrap().remove("Currency");
        let (_server, aggregator) = aggregator_with(overview, quote(), daily()).await;

        let snapshot = aggregator.lookup("EQNR.OL").await.unwrap();
        assert_eq!(snapshot.stock.currency, "NOK");
    }

    #[tokio::test]
    async fn test_non_numeric_price_is_incomplete() {
        let mut quote = quote();
        quote["Global Quote"]["05. price"] = json!("NaN");
        let (_server, aggregator) = aggregator_with(overview(), quote, daily()).await;

        let err = aggregator.lookup("EQNR.OL").await.unwrap_err();
        assert!(matches!(
            err,
            StockError::IncompleteData { field: "price", .. }
        ));
    }

    #[tokio::test]
    async fn test_rate_limit_from_any_endpoint_fails_lookup() {
        let note = json!({"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."});
        let (_server, aggregator) = aggregator_with(overview(), quote(), note).await;

        let err = aggregator.lookup("EQNR.OL").await.unwrap_err();
        assert!(matches!(err, StockError::RateLimited(_)));
    }

    #[tokio::test]
    async fn test_blank_ticker_is_rejected() {
        let (_server, aggregator) = aggregator_with(overview(), quote(), daily()).await;
        let err = aggregator.lookup("   ").await.unwrap_err();
        assert!(matches!(err, StockError::Validation(_)));
    }

    #[test]
    fn test_parse_count_accepts_fractional() {
        assert_eq!(parse_count("X", "volume", Some("1200.0")).unwrap(), 1200);
        assert!(parse_count("X", "volume", Some("None")).is_err());
        assert!(parse_count("X", "volume", Some("-5")).is_err());
        assert!(parse_count("X", "volume", None).is_err());
    }

    #[test]
    fn test_parse_finite_rejects_infinity() {
        assert!(parse_finite("X", "price", Some("inf")).is_err());
        assert!(parse_finite("X", "price", Some("")).is_err());
        assert_eq!(parse_finite("X", "price", Some(" 1.5 ")).unwrap(), 1.5);
    }
}
