mod feature_frame;
mod ohlcv;
mod ticker;
mod timeframe;
pub mod indicators;

pub use feature_frame::{fill_missing, FeatureFrame};
pub use ohlcv::{Ohlcv, BASE_COLUMNS};
pub use ticker::{normalize_ticker, provider_symbol};
pub use timeframe::Timeframe;

use chrono_tz::Tz;

/// Price history for a single (ticker, timeframe), ordered by time ascending
pub type TimeSeries = Vec<Ohlcv>;

/// Bars as returned by a provider, with the exchange calendar they trade on
#[derive(Debug, Clone)]
pub struct PriceHistory {
    pub bars: TimeSeries,
    /// Exchange timezone reported by the provider, `None` when unknown
    pub timezone: Option<Tz>,
}

impl PriceHistory {
    pub fn new(bars: TimeSeries) -> Self {
        Self { bars, timezone: None }
    }

    pub fn with_timezone(mut self, timezone: Option<Tz>) -> Self {
        self.timezone = timezone;
        self
    }
}
