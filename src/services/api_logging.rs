use crate::error::AppError;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// API request performance metrics
#[derive(Debug, Clone)]
pub struct ApiPerformanceMetrics {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: u64,
    pub status: ApiStatus,
    pub endpoint: String,
    pub ticker: String,
    pub timeframe: String,
    pub http_status: u16,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStatus {
    Success,
    Fail,
}

impl ApiPerformanceMetrics {
    pub fn new(endpoint: &str, start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            end_time: start_time,
            duration_ms: 0,
            status: ApiStatus::Success,
            endpoint: endpoint.to_string(),
            ticker: String::new(),
            timeframe: String::new(),
            http_status: 200,
            error_message: None,
        }
    }

    pub fn start(endpoint: &str) -> Self {
        Self::new(endpoint, Utc::now())
    }

    pub fn with_request(mut self, ticker: &str, timeframe: &str) -> Self {
        self.ticker = ticker.to_string();
        self.timeframe = timeframe.to_string();
        self
    }

    pub fn complete(&mut self) {
        self.complete_at(Utc::now());
    }

    pub fn complete_at(&mut self, end_time: DateTime<Utc>) {
        self.end_time = end_time;
        self.duration_ms = (self.end_time - self.start_time).num_milliseconds().max(0) as u64;
    }

    /// Mark the request as failed with the error's HTTP status and message.
    pub fn fail(&mut self, error: &AppError) {
        self.status = ApiStatus::Fail;
        self.http_status = error.status_code().as_u16();
        self.error_message = Some(error.to_string());
    }
}

fn format_duration(duration_ms: u64) -> String {
    if duration_ms >= 1000 {
        format!("{}.{:01}s", duration_ms / 1000, (duration_ms % 1000) / 100)
    } else {
        format!("{}ms", duration_ms)
    }
}

/// Compact single-line summary of a request
pub fn format_api_log_line(metrics: &ApiPerformanceMetrics) -> String {
    let status_str = match metrics.status {
        ApiStatus::Success => "OK",
        ApiStatus::Fail => "FAIL",
    };

    let error_info = if let Some(ref error) = metrics.error_message {
        format!(" error:{}", error)
    } else {
        String::new()
    };

    format!(
        "{} | {} | {} | {} {} | ticker:{} timeframe:{}{}",
        metrics.start_time.format("%Y-%m-%d %H:%M:%S"),
        format_duration(metrics.duration_ms),
        metrics.endpoint,
        status_str,
        metrics.http_status,
        metrics.ticker,
        metrics.timeframe,
        error_info
    )
}

/// Emit the request summary through tracing
pub fn write_api_log_entry(metrics: &ApiPerformanceMetrics) {
    let line = format_api_log_line(metrics);
    match metrics.status {
        ApiStatus::Success => info!(target: "api_requests", "{}", line),
        ApiStatus::Fail => warn!(target: "api_requests", "{}", line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_api_performance_metrics() {
        let start_time = Utc.with_ymd_and_hms(2024, 12, 1, 15, 30, 45).unwrap();
        let mut metrics = ApiPerformanceMetrics::new("/forecast", start_time).with_request("BBCA", "1d");

        metrics.complete_at(start_time + Duration::milliseconds(1250));

        assert_eq!(metrics.status, ApiStatus::Success);
        assert_eq!(metrics.duration_ms, 1250);
        assert_eq!(
            format_api_log_line(&metrics),
            "2024-12-01 15:30:45 | 1.2s | /forecast | OK 200 | ticker:BBCA timeframe:1d"
        );
    }

    #[test]
    fn test_failed_request_line() {
        let start_time = Utc.with_ymd_and_hms(2024, 12, 1, 15, 30, 45).unwrap();
        let mut metrics = ApiPerformanceMetrics::new("/predict", start_time).with_request("ZZZZ", "1d");
        metrics.fail(&AppError::InvalidInput("bad".to_string()));
        metrics.complete_at(start_time + Duration::milliseconds(15));

        let line = format_api_log_line(&metrics);
        assert!(line.contains("15ms"));
        assert!(line.contains("FAIL 400"));
        assert!(line.ends_with("error:Invalid input: bad"));
    }
}
