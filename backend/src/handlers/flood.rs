//! HTTP handlers for the flood risk assessment pipeline

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{DailyPrecipitation, ForecastSummary, RiskAssessment};

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Query parameters for location-based endpoints
#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub location: Option<String>,
}

impl LocationQuery {
    fn require(self) -> AppResult<String> {
        match self.location {
            Some(location) if !location.trim().is_empty() => Ok(location),
            _ => Err(AppError::MissingParameter("location".to_string())),
        }
    }
}

/// 30-day precipitation history response
#[derive(Debug, Serialize)]
pub struct FloodDataResponse {
    pub location: String,
    pub records: Vec<DailyPrecipitation>,
    pub skipped_dates: Vec<NaiveDate>,
}

/// Get the trailing 30-day precipitation history for a location
pub async fn flood_data(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<FloodDataResponse>> {
    let location = query.require()?;

    let history = state
        .flood_service()
        .precipitation_history(&location)
        .await?;

    Ok(Json(FloodDataResponse {
        location,
        skipped_dates: history.skipped.into_iter().map(|s| s.date).collect(),
        records: history.records,
    }))
}

/// Get tomorrow's forecast summary for a location
pub async fn weather_forecast(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<ForecastSummary>> {
    let location = query.require()?;
    let summary = state.flood_service().forecast_summary(&location).await?;
    Ok(Json(summary))
}

/// Request body for flood risk prediction
#[derive(Debug, Deserialize)]
pub struct PredictFloodRequest {
    pub rainfall_mm: Option<f64>,
}

/// Assess flood risk for a rainfall measurement
pub async fn predict_flood(
    State(state): State<AppState>,
    Json(body): Json<PredictFloodRequest>,
) -> AppResult<Json<RiskAssessment>> {
    let rainfall_mm = body
        .rainfall_mm
        .ok_or_else(|| AppError::MissingParameter("rainfall_mm".to_string()))?;

    let assessment = state.flood_service().assess(rainfall_mm)?;
    Ok(Json(assessment))
}
