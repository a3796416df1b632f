//! Quote lookup payload shared by the server and its clients

use serde::{Deserialize, Serialize};

/// Normalized quote and company data for one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    /// Exchange ticker, e.g. `EQNR.OL`
    pub ticker: String,
    /// Company name
    pub name: String,
    /// Latest price
    pub price: f64,
    /// Absolute change against the previous close
    pub change: f64,
    /// Percentage change against the previous close
    pub change_percent: f64,
    /// Market capitalization in `currency`
    pub market_cap: u64,
    /// Volume traded in the latest session
    pub volume: u64,
    /// ISO currency code
    pub currency: String,
}

/// One closing price in the history series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceDataPoint {
    /// Display label for the trading day
    pub date: String,
    /// Closing price
    pub price: f64,
}

/// Body of a successful quote lookup
///
/// `history` is ordered oldest to newest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub stock: Stock,
    pub history: Vec<PriceDataPoint>,
}

impl StockSnapshot {
    /// Most recent closing price in the history, if any
    pub fn latest_close(&self) -> Option<f64> {
        self.history.last().map(|point| point.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_uses_camel_case() {
        let stock = Stock {
            ticker: "EQNR.OL".to_string(),
            name: "Equinor ASA".to_string(),
            price: 270.5,
            change: -2.5,
            change_percent: -0.9158,
            market_cap: 800_000_000_000,
            volume: 1_234_567,
            currency: "NOK".to_string(),
        };

        let value = serde_json::to_value(&stock).unwrap();
        assert_eq!(value["changePercent"], -0.9158);
        assert_eq!(value["marketCap"], 800_000_000_000_u64);
        assert!(value.get("change_percent").is_none());
    }

    #[test]
    fn test_latest_close() {
        let snapshot = StockSnapshot {
            stock: Stock {
                ticker: "DNB.OL".to_string(),
                name: "DNB Bank ASA".to_string(),
                price: 210.0,
                change: 1.0,
                change_percent: 0.48,
                market_cap: 1,
                volume: 1,
                currency: "NOK".to_string(),
            },
            history: vec![
                PriceDataPoint {
                    date: "01 Oct".to_string(),
                    price: 205.0,
                },
                PriceDataPoint {
                    date: "02 Oct".to_string(),
                    price: 210.0,
                },
            ],
        };

        assert_eq!(snapshot.latest_close(), Some(210.0));
    }
}
