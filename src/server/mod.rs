pub mod api;

use crate::services::Forecaster;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};

/// Dashboard origins allowed to call the API from a browser
const ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost",
    "http://localhost:8000",
    "http://localhost:5002",
    "http://127.0.0.1",
    "http://127.0.0.1:8000",
    "http://127.0.0.1:5002",
    "http://0.0.0.0:5002",
];

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub forecaster: Forecaster,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(forecaster: Forecaster) -> Self {
        Self {
            forecaster,
            started_at: Instant::now(),
        }
    }
}

/// Initialize the tracing subscriber (RUST_LOG, default `info`)
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = ALLOWED_ORIGINS
        .iter()
        .map(|origin| HeaderValue::from_static(*origin))
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Build the router with all routes
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/models/available", get(api::available_models_handler))
        .route("/predict", post(api::predict_handler))
        .route("/forecast", post(api::forecast_handler))
        .route("/health", get(api::health_handler))
        .layer(cors_layer())
        .with_state(app_state)
}

/// Start the axum server
pub async fn serve(app_state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting aipriceforecast server");

    tracing::info!("Registering routes:");
    tracing::info!("  GET  /models/available");
    tracing::info!("  POST /predict");
    tracing::info!("  POST /forecast");
    tracing::info!("  GET  /health");

    let app = router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
