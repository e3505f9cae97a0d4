//! Route definitions for the Flood Monitoring Platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Flood risk assessment pipeline (public)
        .route("/flood-data", get(handlers::flood_data))
        .route("/weather-forecast", get(handlers::weather_forecast))
        .route("/predict-flood", post(handlers::predict_flood))
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
}
