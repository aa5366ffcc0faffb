use crate::error::Result;
use crate::server::AppState;
use crate::services::{write_api_log_entry, ApiPerformanceMetrics, AvailableModel, ForecastResponse};
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

fn default_timeframe() -> String {
    "1d".to_string()
}

/// Body of POST /predict
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(alias = "symbol")]
    pub ticker: String,
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
    /// WINDOW_LENGTH rows of FEATURE_COUNT values, oldest first
    #[serde(alias = "feature_window")]
    pub input_data: Vec<Vec<f64>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub forecast: Vec<f64>,
}

/// Body of POST /forecast
#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    #[serde(alias = "symbol")]
    pub ticker: String,
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvailableModelsResponse {
    pub available_models: Vec<AvailableModel>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub models_loaded: usize,
    pub uptime_secs: u64,
    pub current_system_time: String,
}

/// Log the request summary and pass the result through.
fn finish<T>(mut metrics: ApiPerformanceMetrics, result: Result<T>) -> Result<T> {
    if let Err(ref e) = result {
        metrics.fail(e);
    }
    metrics.complete();
    write_api_log_entry(&metrics);
    result
}

/// GET /models/available - List loaded (ticker, timeframe) artifacts
#[instrument(skip(app_state))]
pub async fn available_models_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    let available_models = app_state.forecaster.registry().available();
    debug!(count = available_models.len(), "Listing available models");
    (StatusCode::OK, Json(AvailableModelsResponse { available_models }))
}

/// POST /predict - Forecast from a caller-supplied feature window
///
/// Example body:
/// `{"ticker": "BBCA.JK", "timeframe": "1d", "input_data": [[...24 values...], ... 60 rows]}`
#[instrument(skip(app_state, request), fields(ticker = %request.ticker, timeframe = %request.timeframe))]
pub async fn predict_handler(
    State(app_state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>> {
    let metrics = ApiPerformanceMetrics::start("/predict").with_request(&request.ticker, &request.timeframe);

    let result = app_state
        .forecaster
        .predict(&request.ticker, &request.timeframe, request.input_data)
        .await;
    let forecast = finish(metrics, result)?;

    Ok(Json(PredictResponse {
        forecast: forecast.to_vec(),
    }))
}

/// POST /forecast - Fetch history, build features and forecast
///
/// Example body: `{"ticker": "BBCA", "timeframe": "1h"}`
#[instrument(skip(app_state, request), fields(ticker = %request.ticker, timeframe = %request.timeframe))]
pub async fn forecast_handler(
    State(app_state): State<AppState>,
    Json(request): Json<ForecastRequest>,
) -> Result<Json<ForecastResponse>> {
    let metrics = ApiPerformanceMetrics::start("/forecast").with_request(&request.ticker, &request.timeframe);

    let result = app_state
        .forecaster
        .forecast(&request.ticker, &request.timeframe)
        .await;
    let response = finish(metrics, result)?;

    Ok(Json(response))
}

/// GET /health - Liveness and loaded artifact count
#[instrument(skip(app_state))]
pub async fn health_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    let models_loaded = app_state.forecaster.registry().len();
    let uptime_secs = app_state.started_at.elapsed().as_secs();

    info!(models_loaded, uptime_secs, "Returning health stats");

    // No request log entry for /health (too noisy)
    Json(HealthResponse {
        status: "ok".to_string(),
        models_loaded,
        uptime_secs,
        current_system_time: Utc::now().to_rfc3339(),
    })
}
