//! Flood Monitoring Platform - Backend Server
//!
//! Estimates flood risk for locations in Vietnam by combining geocoding,
//! historical precipitation retrieval, short-term forecasts, and a
//! pre-trained statistical classifier.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;

use external::{GeocodingClient, WeatherApiClient};
use services::{FloodModel, FloodService};

/// Application state shared across handlers.
///
/// The fitted model is loaded once at startup and shared read-only; the
/// HTTP clients carry their own connection pools and per-request timeouts.
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub model: Arc<FloodModel>,
    pub geocoder: GeocodingClient,
    pub weather: WeatherApiClient,
}

impl AppState {
    /// Build the pipeline orchestrator from shared state
    pub fn flood_service(&self) -> FloodService {
        FloodService::new(
            self.geocoder.clone(),
            self.weather.clone(),
            Arc::clone(&self.model),
            self.config.weather.history_concurrency,
        )
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Flood Monitoring Platform API v1.0"
}
