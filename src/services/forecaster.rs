//! Forecast orchestration
//!
//! provider -> feature builder -> last window -> predictor. The artifact is
//! resolved before any network call so unknown tickers fail fast.

use crate::constants::{MIN_HISTORY_BARS, TARGET_COLUMN_INDEX, WINDOW_LENGTH};
use crate::error::{AppError, Result};
use crate::models::Timeframe;
use crate::services::feature_builder::FeatureBuilder;
use crate::services::model_registry::ModelRegistry;
use crate::services::predictor::{predict_window, window_from_rows, Forecast};
use crate::services::price_history::PriceHistoryProvider;
use crate::utils::deduplication::{is_strictly_ascending, sort_and_dedup};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Serialize)]
pub struct ForecastResponse {
    pub ticker: String,
    pub timeframe: String,
    pub forecast: Vec<f64>,
    pub actual_history: Vec<f64>,
    pub actual_history_dates: Vec<String>,
}

#[derive(Clone)]
pub struct Forecaster {
    registry: Arc<ModelRegistry>,
    provider: Arc<dyn PriceHistoryProvider>,
    feature_builder: FeatureBuilder,
}

impl Forecaster {
    pub fn new(
        registry: Arc<ModelRegistry>,
        provider: Arc<dyn PriceHistoryProvider>,
        feature_builder: FeatureBuilder,
    ) -> Self {
        Self {
            registry,
            provider,
            feature_builder,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Forecast the next three bars from freshly fetched history.
    #[instrument(skip(self))]
    pub async fn forecast(&self, ticker: &str, timeframe: &str) -> Result<ForecastResponse> {
        let timeframe: Timeframe = timeframe.parse()?;
        let artifact = self.registry.get(ticker, timeframe)?;
        let ticker = artifact.key.ticker.clone();

        let history = self.provider.fetch_history(&ticker, timeframe).await?;
        let builder = self.feature_builder.for_exchange(history.timezone);
        let tz = builder.timezone();

        let mut bars = history.bars;
        if !is_strictly_ascending(&bars) {
            warn!(provider = self.provider.name(), "Provider returned unordered bars, sorting");
            bars = sort_and_dedup(bars);
        }
        if bars.len() < MIN_HISTORY_BARS {
            return Err(AppError::InsufficientHistory {
                required: MIN_HISTORY_BARS,
                available: bars.len(),
            });
        }

        let (forecast, window) = tokio::task::spawn_blocking(move || {
            let frame = builder.build(&bars);
            let window = frame.tail(WINDOW_LENGTH).ok_or(AppError::InsufficientHistory {
                required: WINDOW_LENGTH,
                available: frame.len(),
            })?;
            let forecast = predict_window(&artifact, window.values())?;
            Ok::<_, AppError>((forecast, window))
        })
        .await
        .map_err(|e| AppError::Model(format!("Inference task failed: {}", e)))??;

        let actual_history = window.column(TARGET_COLUMN_INDEX).to_vec();
        let actual_history_dates = window
            .times()
            .iter()
            .map(|t| timeframe.format_time(&t.with_timezone(&tz)))
            .collect();

        info!(
            ticker = %ticker,
            timeframe = %timeframe,
            forecast = ?forecast,
            "Forecast complete"
        );

        Ok(ForecastResponse {
            ticker,
            timeframe: timeframe.to_string(),
            forecast: forecast.to_vec(),
            actual_history,
            actual_history_dates,
        })
    }

    /// Predict from a caller-supplied feature window.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn predict(&self, ticker: &str, timeframe: &str, rows: Vec<Vec<f64>>) -> Result<Forecast> {
        let timeframe: Timeframe = timeframe.parse()?;
        let artifact = self.registry.get(ticker, timeframe)?;
        let window = window_from_rows(&rows)?;

        tokio::task::spawn_blocking(move || predict_window(&artifact, window.view()))
            .await
            .map_err(|e| AppError::Model(format!("Inference task failed: {}", e)))?
    }
}
