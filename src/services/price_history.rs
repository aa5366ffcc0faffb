use crate::error::Result;
use crate::models::{PriceHistory, Timeframe};
use async_trait::async_trait;

/// Source of raw OHLCV history for forecasting
///
/// Implementations return bars sorted by time ascending with unique
/// timestamps, tagged with the exchange timezone when the source knows it.
/// An empty history is an error, never an empty `Ok`.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Human-readable provider name for logs
    fn name(&self) -> &'static str;

    async fn fetch_history(&self, ticker: &str, timeframe: Timeframe) -> Result<PriceHistory>;
}
