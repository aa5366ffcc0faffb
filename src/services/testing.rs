//! Stubs shared by unit tests: a deterministic model, identity scaler and
//! in-memory price history.

use crate::constants::{FEATURE_COUNT, TARGET_COLUMN_INDEX};
use crate::error::{AppError, Result};
use crate::models::{Ohlcv, PriceHistory, TimeSeries, Timeframe};
use crate::services::model_registry::{ArtifactKey, ModelArtifact, ModelRegistry};
use crate::services::price_history::PriceHistoryProvider;
use crate::services::scaler::{Scaler, ScalerArtifact};
use crate::services::sequence_model::SequenceModel;
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use chrono_tz::Tz;
use ndarray::Array3;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Predicts the last scaled close, plus 1 and 2 for later horizons
pub(crate) struct LastCloseModel;

impl SequenceModel for LastCloseModel {
    fn predict(&mut self, input: Array3<f32>) -> Result<Vec<f32>> {
        let steps = input.shape()[1];
        let last = input[[0, steps - 1, TARGET_COLUMN_INDEX]];
        Ok(vec![last, last + 1.0, last + 2.0])
    }
}

/// Returns the same outputs for any input
pub(crate) struct FixedModel(pub Vec<f32>);

impl SequenceModel for FixedModel {
    fn predict(&mut self, _input: Array3<f32>) -> Result<Vec<f32>> {
        Ok(self.0.clone())
    }
}

/// Records how many inferences ran and whether two ever overlapped
#[derive(Default)]
pub(crate) struct InferenceLog {
    in_flight: AtomicBool,
    overlapped: AtomicBool,
    calls: AtomicUsize,
}

impl InferenceLog {
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn overlapped(&self) -> bool {
        self.overlapped.load(Ordering::SeqCst)
    }
}

/// `LastCloseModel` that holds each call open briefly and logs overlaps
pub(crate) struct ExclusiveModel(pub Arc<InferenceLog>);

impl SequenceModel for ExclusiveModel {
    fn predict(&mut self, input: Array3<f32>) -> Result<Vec<f32>> {
        let log = &self.0;
        if log.in_flight.swap(true, Ordering::SeqCst) {
            log.overlapped.store(true, Ordering::SeqCst);
        }
        std::thread::sleep(std::time::Duration::from_millis(2));
        let outputs = LastCloseModel.predict(input);
        log.calls.fetch_add(1, Ordering::SeqCst);
        log.in_flight.store(false, Ordering::SeqCst);
        outputs
    }
}

pub(crate) fn identity_scaler() -> ScalerArtifact {
    ScalerArtifact::new(Scaler::Standard {
        mean: vec![0.0; FEATURE_COUNT],
        scale: vec![1.0; FEATURE_COUNT],
    })
}

pub(crate) fn identity_scaler_json() -> String {
    serde_json::to_string(&identity_scaler()).unwrap()
}

/// Registry of `LastCloseModel` artifacts with identity scalers
pub(crate) fn registry_with(keys: &[(&str, Timeframe)]) -> ModelRegistry {
    ModelRegistry::from_artifacts(keys.iter().map(|(ticker, timeframe)| {
        ModelArtifact::new(ArtifactKey::new(ticker, *timeframe), Box::new(LastCloseModel), identity_scaler())
    }))
}

/// Synthetic daily bars with a rising close, one per calendar day
pub(crate) fn rising_daily_bars(count: usize) -> Vec<Ohlcv> {
    let start = Utc.with_ymd_and_hms(2023, 1, 2, 2, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let close = 1000.0 + i as f64 * 5.0 + (i as f64 * 0.7).sin() * 2.0;
            Ohlcv::new(
                start + Duration::days(i as i64),
                close - 3.0,
                close + 6.0,
                close - 8.0,
                close,
                1_000_000 + (i as u64 % 7) * 10_000,
            )
        })
        .collect()
}

/// In-memory provider that counts fetches
pub(crate) struct StubProvider {
    bars: TimeSeries,
    timezone: Option<Tz>,
    calls: AtomicUsize,
}

impl StubProvider {
    pub(crate) fn new(bars: TimeSeries) -> Self {
        Self {
            bars,
            timezone: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = Some(timezone);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceHistoryProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn fetch_history(&self, ticker: &str, _timeframe: Timeframe) -> Result<PriceHistory> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.bars.is_empty() {
            return Err(AppError::EmptyHistory(ticker.to_string()));
        }
        Ok(PriceHistory::new(self.bars.clone()).with_timezone(self.timezone))
    }
}
