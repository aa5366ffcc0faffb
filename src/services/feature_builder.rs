//! Feature construction from raw OHLCV bars
//!
//! Produces the [`FEATURE_COLUMNS`](crate::constants::FEATURE_COLUMNS) matrix
//! the forecasting models were trained on. Indicator parameters live in
//! [`crate::constants`]; changing any of them changes model input.

use crate::constants::*;
use crate::models::indicators::{
    calculate_adx, calculate_atr, calculate_bollinger, calculate_macd, calculate_obv, calculate_rsi,
    calculate_session_vwap, calculate_sma, calculate_stochastic,
};
use crate::models::{FeatureFrame, Ohlcv};
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::collections::HashMap;
use tracing::debug;

/// Builds feature frames from bars of one (symbol, timeframe)
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    /// Timezone whose calendar days delimit VWAP sessions
    timezone: Tz,
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self::new(chrono_tz::Asia::Jakarta)
    }
}

impl FeatureBuilder {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Same builder with sessions in `timezone`, or unchanged when `None`.
    pub fn for_exchange(&self, timezone: Option<Tz>) -> Self {
        Self::new(timezone.unwrap_or(self.timezone))
    }

    /// Build the filled feature frame: one row per bar, fixed column order,
    /// no missing cells.
    pub fn build(&self, bars: &[Ohlcv]) -> FeatureFrame {
        let columns = self.compute_columns(bars);
        let times = bars.iter().map(|b| b.time).collect();

        let mut frame = FeatureFrame::from_named_columns(times, &columns);
        frame.fill_missing();

        debug!(rows = frame.len(), columns = FEATURE_COUNT, "Built feature frame");
        frame
    }

    /// Compute every named feature column, with NaN where undefined.
    pub fn compute_columns(&self, bars: &[Ohlcv]) -> HashMap<&'static str, Vec<f64>> {
        let opens: Vec<f64> = bars.iter().map(|b| b.open).collect();
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume as f64).collect();

        let mut columns: HashMap<&'static str, Vec<f64>> = HashMap::with_capacity(FEATURE_COUNT);

        // 1. Moving averages
        columns.insert("SMA_20", calculate_sma(&closes, SMA_FAST_PERIOD));
        columns.insert("SMA_50", calculate_sma(&closes, SMA_SLOW_PERIOD));

        // 2. MACD triple
        let macd = calculate_macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
        columns.insert("MACD", macd.macd);
        columns.insert("MACD_signal", macd.signal);
        columns.insert("MACD_hist", macd.histogram);

        // 3. RSI
        columns.insert("RSI_14", calculate_rsi(&closes, RSI_PERIOD));

        // 4. Bollinger quintuple
        let bb = calculate_bollinger(&closes, BB_PERIOD, BB_STD_MULTIPLIER);
        columns.insert("BB_lower", bb.lower);
        columns.insert("BB_mid", bb.middle);
        columns.insert("BB_upper", bb.upper);
        columns.insert("BB_width", bb.bandwidth);
        columns.insert("BB_pct", bb.percent);

        // 5. Stochastic
        let (stoch_k, stoch_d) =
            calculate_stochastic(&highs, &lows, &closes, STOCH_K_PERIOD, STOCH_K_SMOOTH, STOCH_D_SMOOTH);
        columns.insert("STOCH_k", stoch_k);
        columns.insert("STOCH_d", stoch_d);

        // 6. ADX / DI
        let adx = calculate_adx(&highs, &lows, &closes, ADX_PERIOD);
        columns.insert("ADX_14", adx.adx);
        columns.insert("DI_plus", adx.di_plus);
        columns.insert("DI_minus", adx.di_minus);

        // 7. ATR (Wilder)
        columns.insert("ATR_14", calculate_atr(&highs, &lows, &closes, ATR_PERIOD));

        // 8. OBV
        columns.insert("OBV", calculate_obv(&closes, &volumes));

        // 9. Day-session VWAP
        let typical: Vec<f64> = bars.iter().map(|b| b.typical_price()).collect();
        let sessions: Vec<NaiveDate> = bars
            .iter()
            .map(|b| b.time.with_timezone(&self.timezone).date_naive())
            .collect();
        columns.insert("VWAP_day", calculate_session_vwap(&typical, &volumes, &sessions));

        columns.insert("open", opens);
        columns.insert("high", highs);
        columns.insert("low", lows);
        columns.insert("close", closes);
        columns.insert("volume", volumes);

        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::feature_column;
    use crate::services::testing::rising_daily_bars;
    use chrono::{DateTime, TimeZone, Utc};

    fn hourly_bar(time: DateTime<Utc>, price: f64, volume: u64) -> Ohlcv {
        Ohlcv::new(time, price, price, price, price, volume)
    }

    #[test]
    fn test_build_emits_fixed_columns() {
        let bars = rising_daily_bars(200);
        let frame = FeatureBuilder::default().build(&bars);

        assert_eq!(frame.len(), 200);
        assert_eq!(frame.values().ncols(), FEATURE_COUNT);
        assert_eq!(frame.column_names(), FEATURE_COLUMNS);
        assert!(!frame.has_missing());
    }

    #[test]
    fn test_compute_columns_covers_schema() {
        let columns = FeatureBuilder::default().compute_columns(&rising_daily_bars(10));
        for name in FEATURE_COLUMNS {
            assert!(columns.contains_key(name), "missing column {}", name);
        }
        assert_eq!(columns.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_raw_columns_pass_through() {
        let bars = rising_daily_bars(60);
        let frame = FeatureBuilder::default().build(&bars);

        for (row, bar) in bars.iter().enumerate() {
            assert_eq!(frame.values()[[row, feature_column::OPEN]], bar.open);
            assert_eq!(frame.values()[[row, feature_column::HIGH]], bar.high);
            assert_eq!(frame.values()[[row, feature_column::LOW]], bar.low);
            assert_eq!(frame.values()[[row, feature_column::CLOSE]], bar.close);
            assert_eq!(frame.values()[[row, feature_column::VOLUME]], bar.volume as f64);
        }
    }

    #[test]
    fn test_warmup_rows_are_back_filled() {
        let bars = rising_daily_bars(100);
        let builder = FeatureBuilder::default();
        let raw = builder.compute_columns(&bars);
        let frame = builder.build(&bars);

        // SMA_50 is undefined for the first 49 bars and back-filled from bar 49
        assert!(raw["SMA_50"][48].is_nan());
        let first_defined = raw["SMA_50"][49];
        for row in 0..49 {
            assert_eq!(frame.values()[[row, feature_column::SMA_50]], first_defined);
        }
    }

    #[test]
    fn test_short_history_zero_fills_undefined_columns() {
        // Too short for ADX to ever be defined
        let bars = rising_daily_bars(20);
        let frame = FeatureBuilder::default().build(&bars);
        assert!(frame.column(feature_column::ADX_14).iter().all(|v| *v == 0.0));
        assert!(!frame.has_missing());
    }

    #[test]
    fn test_vwap_resets_at_market_day_boundary() {
        // 2024-03-04 09:00 and 10:00 WIB, then 2024-03-05 09:00 WIB (UTC+7)
        let day1_a = Utc.with_ymd_and_hms(2024, 3, 4, 2, 0, 0).unwrap();
        let day1_b = Utc.with_ymd_and_hms(2024, 3, 4, 3, 0, 0).unwrap();
        let day2_a = Utc.with_ymd_and_hms(2024, 3, 5, 2, 0, 0).unwrap();
        let bars = vec![
            hourly_bar(day1_a, 100.0, 10),
            hourly_bar(day1_b, 110.0, 30),
            hourly_bar(day2_a, 120.0, 5),
        ];

        let columns = FeatureBuilder::new(chrono_tz::Asia::Jakarta).compute_columns(&bars);
        let vwap = &columns["VWAP_day"];
        assert!((vwap[0] - 100.0).abs() < 1e-9);
        assert!((vwap[1] - 107.5).abs() < 1e-9);
        assert!((vwap[2] - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_vwap_session_follows_timezone() {
        // 23:00 and 01:00 UTC are the same Jakarta day but different UTC days
        let a = Utc.with_ymd_and_hms(2024, 3, 4, 23, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 3, 5, 1, 0, 0).unwrap();
        let bars = vec![hourly_bar(a, 100.0, 10), hourly_bar(b, 200.0, 10)];

        let jakarta = FeatureBuilder::new(chrono_tz::Asia::Jakarta).compute_columns(&bars);
        assert!((jakarta["VWAP_day"][1] - 150.0).abs() < 1e-9);

        let utc = FeatureBuilder::new(chrono_tz::UTC).compute_columns(&bars);
        assert!((utc["VWAP_day"][1] - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_vwap_keeps_us_session_whole() {
        // NYSE regular session 2024-03-04, 14:30 to 20:30 UTC, crosses Jakarta midnight
        let open = Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap();
        let bars: Vec<Ohlcv> = (0..7)
            .map(|i| hourly_bar(open + chrono::Duration::hours(i), 10.0 * (i + 1) as f64, 1))
            .collect();

        let builder = FeatureBuilder::default().for_exchange(Some(chrono_tz::America::New_York));
        assert_eq!(builder.timezone(), chrono_tz::America::New_York);
        let vwap = &builder.compute_columns(&bars)["VWAP_day"];
        assert!((vwap[6] - 40.0).abs() < 1e-9);

        // Without an exchange calendar the Jakarta day splits the session
        let fallback = FeatureBuilder::default().for_exchange(None);
        assert_eq!(fallback.timezone(), chrono_tz::Asia::Jakarta);
        assert!((fallback.compute_columns(&bars)["VWAP_day"][6] - 40.0).abs() > 1.0);
    }
}
