use crate::commands::build_forecaster;
use crate::error::Result;
use std::path::PathBuf;

pub async fn run(ticker: String, timeframe: String, model_dir: Option<PathBuf>) {
    match forecast_json(&ticker, &timeframe, model_dir).await {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn forecast_json(ticker: &str, timeframe: &str, model_dir: Option<PathBuf>) -> Result<String> {
    let forecaster = build_forecaster(model_dir)?;
    let response = forecaster.forecast(ticker, timeframe).await?;
    Ok(serde_json::to_string_pretty(&response)?)
}
