use crate::error::{AppError, Result};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timeframe of a trained forecasting model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    /// 1-hour candles
    #[serde(rename = "1h")]
    Hour1,
    /// Daily candles
    #[serde(rename = "1d")]
    Day1,
}

impl Timeframe {
    /// Key used in artifact file names and API payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Hour1 => "1h",
            Timeframe::Day1 => "1d",
        }
    }

    /// Interval parameter of the Yahoo Finance chart API
    pub fn provider_interval(&self) -> &'static str {
        match self {
            Timeframe::Hour1 => "60m",
            Timeframe::Day1 => "1d",
        }
    }

    /// History range requested from the provider.
    ///
    /// Intraday history is capped at 60 days upstream.
    pub fn provider_range(&self) -> &'static str {
        match self {
            Timeframe::Hour1 => "60d",
            Timeframe::Day1 => "2y",
        }
    }

    pub fn is_intraday(&self) -> bool {
        matches!(self, Timeframe::Hour1)
    }

    /// Format a bar timestamp for `actual_history_dates`
    pub fn format_time<Tz: TimeZone>(&self, time: &DateTime<Tz>) -> String
    where
        Tz::Offset: fmt::Display,
    {
        if self.is_intraday() {
            time.format("%Y-%m-%d %H:%M").to_string()
        } else {
            time.format("%Y-%m-%d").to_string()
        }
    }

    /// Get all supported timeframes
    pub fn all() -> Vec<Timeframe> {
        vec![Timeframe::Hour1, Timeframe::Day1]
    }

    fn supported_list() -> String {
        Self::all()
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Timeframe {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "1h" | "60m" => Ok(Timeframe::Hour1),
            "1d" => Ok(Timeframe::Day1),
            _ => Err(AppError::InvalidInput(format!(
                "Timeframe '{}' is not supported. Supported timeframes: {}",
                s,
                Self::supported_list()
            ))),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_timeframe_from_str() {
        assert_eq!("1d".parse::<Timeframe>().unwrap(), Timeframe::Day1);
        assert_eq!("1D".parse::<Timeframe>().unwrap(), Timeframe::Day1);
        assert_eq!("1h".parse::<Timeframe>().unwrap(), Timeframe::Hour1);
        assert_eq!("60m".parse::<Timeframe>().unwrap(), Timeframe::Hour1);

        let err = "1w".parse::<Timeframe>().unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(err.to_string().contains("1h, 1d"));
    }

    #[test]
    fn test_provider_mapping() {
        assert_eq!(Timeframe::Hour1.provider_interval(), "60m");
        assert_eq!(Timeframe::Hour1.provider_range(), "60d");
        assert_eq!(Timeframe::Day1.provider_interval(), "1d");
        assert_eq!(Timeframe::Day1.provider_range(), "2y");
    }

    #[test]
    fn test_format_time() {
        let t = Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap();
        assert_eq!(Timeframe::Day1.format_time(&t), "2024-03-05");
        assert_eq!(Timeframe::Hour1.format_time(&t), "2024-03-05 09:30");
    }

    #[test]
    fn test_timeframe_serde() {
        assert_eq!(serde_json::to_string(&Timeframe::Day1).unwrap(), r#""1d""#);
        let tf: Timeframe = serde_json::from_str(r#""1h""#).unwrap();
        assert_eq!(tf, Timeframe::Hour1);
    }
}
