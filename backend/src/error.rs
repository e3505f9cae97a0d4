//! Error handling for the Flood Monitoring Platform
//!
//! Every failure that crosses the handler boundary is translated into one
//! of these kinds; raw collaborator errors never reach the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Request errors
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("No forecast data available")]
    NoForecastData,

    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    // External service errors
    #[error("Geocoding service error: {0}")]
    Geocoding(String),

    #[error("Weather API error: {0}")]
    WeatherApi(String),

    // Inference errors
    #[error("Model inference error: {0}")]
    ModelInference(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    Unexpected(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::MissingParameter(_) => (StatusCode::BAD_REQUEST, "MISSING_PARAMETER"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::LocationNotFound(_) => (StatusCode::NOT_FOUND, "LOCATION_NOT_FOUND"),
            AppError::NoForecastData => (StatusCode::NOT_FOUND, "NO_FORECAST_DATA"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::DuplicateEntry(_) => (StatusCode::CONFLICT, "DUPLICATE_ENTRY"),
            AppError::Geocoding(_) => (StatusCode::BAD_GATEWAY, "GEOCODING_ERROR"),
            AppError::WeatherApi(_) => (StatusCode::BAD_GATEWAY, "WEATHER_API_ERROR"),
            AppError::ModelInference(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "MODEL_INFERENCE_ERROR")
            }
            AppError::Configuration(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
            }
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            AppError::Internal(_) | AppError::Unexpected(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }

    fn public_message(&self) -> String {
        match self {
            // Never leak database or internal details to the caller
            AppError::Database(_) => "A database error occurred".to_string(),
            AppError::Unexpected(_) => "An internal server error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let detail = ErrorDetail {
            code: code.to_string(),
            message: self.public_message(),
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Client error: {:?}", self);
        }

        (status, Json(ErrorResponse { error: detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
