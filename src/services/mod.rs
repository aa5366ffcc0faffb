pub mod api_logging;
pub mod feature_builder;
pub mod forecaster;
pub mod model_registry;
pub mod predictor;
pub mod price_history;
pub mod scaler;
pub mod sequence_model;
pub mod yahoo;

#[cfg(test)]
pub(crate) mod testing;

pub use api_logging::{write_api_log_entry, ApiPerformanceMetrics, ApiStatus};
pub use feature_builder::FeatureBuilder;
pub use forecaster::{ForecastResponse, Forecaster};
pub use model_registry::{ArtifactKey, AvailableModel, ModelArtifact, ModelRegistry};
pub use predictor::{predict, predict_window, Forecast};
pub use price_history::PriceHistoryProvider;
pub use scaler::{Scaler, ScalerArtifact};
pub use sequence_model::{OnnxSequenceModel, SequenceModel};
pub use yahoo::YahooFinanceClient;
