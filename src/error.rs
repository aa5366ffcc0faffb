use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum AppError {
    #[error("Missing base column '{0}' in price history")]
    MissingColumn(String),

    #[error("Insufficient history: {required} bars required, {available} available (short by {})", required.saturating_sub(*available))]
    InsufficientHistory { required: usize, available: usize },

    #[error("No model found for ticker '{ticker}' and timeframe '{timeframe}'. Available models: {}", format_available(available))]
    ArtifactNotFound {
        ticker: String,
        timeframe: String,
        available: Vec<(String, String)>,
    },

    #[error("Input window must have shape ({expected_rows}, {expected_cols}), received ({rows}, {cols})")]
    ShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Upstream provider error: {0}")]
    UpstreamProvider(String),

    #[error("No price history returned for '{0}'")]
    EmptyHistory(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

fn format_available(available: &[(String, String)]) -> String {
    if available.is_empty() {
        return "none".to_string();
    }
    available
        .iter()
        .map(|(ticker, timeframe)| format!("{}-{}", ticker, timeframe))
        .collect::<Vec<_>>()
        .join(", ")
}

impl AppError {
    /// Stable machine-readable kind, used as the `error` field of HTTP bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::MissingColumn(_) => "missing_column",
            AppError::InsufficientHistory { .. } => "insufficient_history",
            AppError::ArtifactNotFound { .. } => "artifact_not_found",
            AppError::ShapeMismatch { .. } => "shape_mismatch",
            AppError::UpstreamProvider(_) | AppError::EmptyHistory(_) => "upstream_provider",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::Model(_) => "model_error",
            AppError::Config(_) => "config_error",
            AppError::Io(_) => "io_error",
            AppError::Parse(_) => "parse_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ArtifactNotFound { .. } | AppError::EmptyHistory(_) => StatusCode::NOT_FOUND,
            AppError::ShapeMismatch { .. } | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientHistory { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::MissingColumn(_) | AppError::UpstreamProvider(_) => StatusCode::BAD_GATEWAY,
            AppError::Model(_) | AppError::Config(_) | AppError::Io(_) | AppError::Parse(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.kind(),
            "detail": self.to_string(),
        });
        (self.status_code(), axum::Json(body)).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::UpstreamProvider(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
