use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;

#[derive(Parser)]
#[command(name = "aipriceforecast")]
#[command(about = "AI Price Forecast CLI", long_about = None)]
pub struct Cli {
    /// Directory holding lstm_model_*.onnx and scaler_*.json artifacts (overrides MODEL_DIR)
    #[arg(long, global = true)]
    pub model_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the forecasting server
    Serve {
        /// Port to listen on (overrides PORT, default 5002)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// List loadable forecasting models
    Models,
    /// Fetch history and print a forecast as JSON
    Forecast {
        /// Ticker symbol, e.g. BBCA or BBCA.JK
        #[arg(short, long)]
        ticker: String,
        /// Timeframe: 1h or 1d
        #[arg(long, default_value = "1d")]
        timeframe: String,
    },
}

pub async fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            commands::serve::run(port, cli.model_dir).await;
        }
        Commands::Models => {
            commands::models::run(cli.model_dir);
        }
        Commands::Forecast { ticker, timeframe } => {
            commands::forecast::run(ticker, timeframe, cli.model_dir).await;
        }
    }
}
