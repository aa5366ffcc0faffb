use crate::commands::build_forecaster;
use crate::server::{self, AppState};
use crate::utils::get_port;
use std::path::PathBuf;

pub async fn run(port: Option<u16>, model_dir: Option<PathBuf>) {
    let port = port.unwrap_or_else(get_port);
    println!("🚀 Starting aipriceforecast server on port {}", port);

    let forecaster = match build_forecaster(model_dir) {
        Ok(forecaster) => forecaster,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    };

    let loaded = forecaster.registry().len();
    if loaded == 0 {
        println!("⚠️  No forecasting models loaded, every prediction will return 404");
    } else {
        println!("✅ Loaded {} forecasting model(s)", loaded);
        for model in forecaster.registry().available() {
            println!("   📈 {} ({})", model.ticker, model.timeframe);
        }
    }

    if let Err(e) = server::serve(AppState::new(forecaster), port).await {
        eprintln!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}
