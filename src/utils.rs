pub mod deduplication;

use crate::error::{AppError, Result};
use chrono_tz::Tz;
use std::path::PathBuf;

/// Default HTTP port of the forecasting server
pub const DEFAULT_PORT: u16 = 5002;

/// Default Yahoo Finance API host
pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Default market timezone (IDX, matching the `.JK` default suffix)
pub const DEFAULT_MARKET_TIMEZONE: &str = "Asia/Jakarta";

/// Get model artifact directory from environment variable or use default
pub fn get_model_dir() -> PathBuf {
    std::env::var("MODEL_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("models/forecasting"))
}

/// Get server port from environment variable or use default
pub fn get_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Get Yahoo Finance base URL from environment variable or use default
pub fn get_yahoo_base_url() -> String {
    std::env::var("YAHOO_BASE_URL").unwrap_or_else(|_| DEFAULT_YAHOO_BASE_URL.to_string())
}

/// Get the market timezone used for VWAP session boundaries
pub fn get_market_timezone() -> Result<Tz> {
    let name = std::env::var("MARKET_TIMEZONE").unwrap_or_else(|_| DEFAULT_MARKET_TIMEZONE.to_string());
    parse_timezone(&name)
}

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| AppError::Config(format!("Invalid MARKET_TIMEZONE '{}': {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("Asia/Jakarta").unwrap(), chrono_tz::Asia::Jakarta);
        assert_eq!(parse_timezone("UTC").unwrap(), chrono_tz::UTC);
        assert!(matches!(parse_timezone("Mars/Olympus"), Err(AppError::Config(_))));
    }
}
