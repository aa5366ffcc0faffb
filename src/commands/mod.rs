pub mod forecast;
pub mod models;
pub mod serve;

use crate::error::Result;
use crate::services::{FeatureBuilder, Forecaster, ModelRegistry, YahooFinanceClient};
use crate::utils::{get_market_timezone, get_model_dir, get_yahoo_base_url};
use std::path::PathBuf;
use std::sync::Arc;

/// Load artifacts and wire the Yahoo provider into a forecaster.
///
/// `model_dir` overrides `MODEL_DIR`.
pub fn build_forecaster(model_dir: Option<PathBuf>) -> Result<Forecaster> {
    let model_dir = model_dir.unwrap_or_else(get_model_dir);
    let timezone = get_market_timezone()?;

    let registry = Arc::new(ModelRegistry::load_from_dir(&model_dir));
    let provider = Arc::new(YahooFinanceClient::new(&get_yahoo_base_url())?);

    Ok(Forecaster::new(registry, provider, FeatureBuilder::new(timezone)))
}
