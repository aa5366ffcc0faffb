//! Feature Schema Constants
//!
//! Defines the ordered feature columns the forecasting models are trained on,
//! together with the window and horizon sizes of the inference contract.
//!
//! ## Schema Versions
//!
//! **Current Schema (v1)**: 24 columns
//! - 5 raw OHLCV columns
//! - 19 technical indicator columns
//!
//! Scalers that declare a `schema_version` or `feature_names` are checked
//! against these constants when the model directory is scanned.

/// Version of the feature column layout below.
pub const FEATURE_SCHEMA_VERSION: u32 = 1;

/// Ordered feature columns. Scalers and models index features positionally.
pub const FEATURE_COLUMNS: &[&str] = &[
    "open",
    "high",
    "low",
    "close",
    "volume",
    "SMA_20",
    "SMA_50",
    "MACD",
    "MACD_signal",
    "MACD_hist",
    "RSI_14",
    "BB_lower",
    "BB_mid",
    "BB_upper",
    "BB_width",
    "BB_pct",
    "STOCH_k",
    "STOCH_d",
    "ADX_14",
    "DI_plus",
    "DI_minus",
    "ATR_14",
    "OBV",
    "VWAP_day",
];

/// Number of feature columns
pub const FEATURE_COUNT: usize = FEATURE_COLUMNS.len();

/// Column indices into a feature row (0-indexed)
pub mod feature_column {
    pub const OPEN: usize = 0;
    pub const HIGH: usize = 1;
    pub const LOW: usize = 2;
    pub const CLOSE: usize = 3;
    pub const VOLUME: usize = 4;
    pub const SMA_20: usize = 5;
    pub const SMA_50: usize = 6;
    pub const MACD: usize = 7;
    pub const MACD_SIGNAL: usize = 8;
    pub const MACD_HIST: usize = 9;
    pub const RSI_14: usize = 10;
    pub const BB_LOWER: usize = 11;
    pub const BB_MID: usize = 12;
    pub const BB_UPPER: usize = 13;
    pub const BB_WIDTH: usize = 14;
    pub const BB_PCT: usize = 15;
    pub const STOCH_K: usize = 16;
    pub const STOCH_D: usize = 17;
    pub const ADX_14: usize = 18;
    pub const DI_PLUS: usize = 19;
    pub const DI_MINUS: usize = 20;
    pub const ATR_14: usize = 21;
    pub const OBV: usize = 22;
    pub const VWAP_DAY: usize = 23;
}

/// Column predicted by the sequence models
pub const TARGET_COLUMN: &str = "close";

/// Position of [`TARGET_COLUMN`] in [`FEATURE_COLUMNS`]
pub const TARGET_COLUMN_INDEX: usize = feature_column::CLOSE;

/// Input sequence length (look-back window) of the models
pub const WINDOW_LENGTH: usize = 60;

/// Number of forecast horizons (t+1, t+2, t+3)
pub const N_HORIZONS: usize = 3;

/// Warm-up bars required on top of the window before indicators settle
pub const INDICATOR_WARMUP_BARS: usize = 100;

/// Minimum number of bars accepted from the price-history provider
pub const MIN_HISTORY_BARS: usize = WINDOW_LENGTH + INDICATOR_WARMUP_BARS;

// Indicator parameters
pub const SMA_FAST_PERIOD: usize = 20;
pub const SMA_SLOW_PERIOD: usize = 50;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const RSI_PERIOD: usize = 14;
pub const BB_PERIOD: usize = 20;
/// Standard-deviation multiplier shared by band construction and column identity
pub const BB_STD_MULTIPLIER: f64 = 2.0;
pub const STOCH_K_PERIOD: usize = 14;
pub const STOCH_K_SMOOTH: usize = 3;
pub const STOCH_D_SMOOTH: usize = 3;
pub const ADX_PERIOD: usize = 14;
pub const ATR_PERIOD: usize = 14;

/// Market suffix stripped from tickers before artifact lookup
pub const DEFAULT_MARKET_SUFFIX: &str = ".JK";

/// Exchange suffixes recognised on provider symbols. Tickers without one of
/// these get [`DEFAULT_MARKET_SUFFIX`] appended.
pub const KNOWN_EXCHANGE_SUFFIXES: &[&str] = &[".JK", ".NS", ".L", ".PA", ".DE", ".O", ".N", ".T", ".TO"];

/// Artifact file naming
pub const MODEL_FILE_PREFIX: &str = "lstm_model_";
pub const MODEL_FILE_EXTENSION: &str = ".onnx";
pub const SCALER_FILE_PREFIX: &str = "scaler_";
pub const SCALER_FILE_EXTENSION: &str = ".json";
