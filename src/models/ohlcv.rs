use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Base columns every price source must provide
pub const BASE_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

/// One OHLCV bar of a (symbol, timeframe) series
///
/// Series are ordered by `time` ascending with no duplicate timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ohlcv {
    /// Bar open, unix seconds on the wire
    #[serde(with = "chrono::serde::ts_seconds")]
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    /// Provider symbol, e.g. `BBCA.JK`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl Ohlcv {
    pub fn new(time: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
            symbol: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// (high + low + close) / 3, the VWAP input
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Finite, non-negative prices with `low <= high`
    pub fn is_consistent(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        prices.iter().all(|p| p.is_finite() && *p >= 0.0) && self.low <= self.high
    }
}
