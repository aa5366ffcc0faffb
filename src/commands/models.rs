use crate::services::ModelRegistry;
use crate::utils::get_model_dir;
use std::path::PathBuf;

pub fn run(model_dir: Option<PathBuf>) {
    let model_dir = model_dir.unwrap_or_else(get_model_dir);
    println!("📁 Model directory: {}\n", model_dir.display());

    let registry = ModelRegistry::load_from_dir(&model_dir);
    if registry.is_empty() {
        println!("⚠️  No forecasting models found.");
        println!("   Expected pairs of lstm_model_{{TICKER}}_{{TIMEFRAME}}.onnx and scaler_{{TICKER}}_{{TIMEFRAME}}.json");
        return;
    }

    println!("{:<12} {}", "TICKER", "TIMEFRAME");
    for model in registry.available() {
        println!("{:<12} {}", model.ticker, model.timeframe);
    }
    println!("\n✅ {} model(s) available", registry.len());
}
