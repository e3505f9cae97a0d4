//! Flood risk assessment pipeline
//!
//! Composes the geocoder with the weather client and the fitted model.
//! Three paths: 30-day precipitation history, next-day forecast summary,
//! and rainfall risk assessment.

use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use shared::{
    Coordinates, DailyPrecipitation, ForecastSummary, PrecipitationHistory, RiskAssessment,
    SkippedDate,
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::{AppError, AppResult};
use crate::external::weather::ForecastResponse;
use crate::external::{GeocodingClient, WeatherApiClient};
use crate::services::model::FloodModel;

/// Length of the trailing precipitation window, in days
pub const HISTORY_WINDOW_DAYS: u32 = 30;

/// Forecast window requested upstream: today plus tomorrow
const FORECAST_WINDOW_DAYS: u8 = 2;

/// Pipeline orchestrator
#[derive(Clone)]
pub struct FloodService {
    geocoder: GeocodingClient,
    weather: WeatherApiClient,
    model: Arc<FloodModel>,
    history_concurrency: usize,
}

impl FloodService {
    pub fn new(
        geocoder: GeocodingClient,
        weather: WeatherApiClient,
        model: Arc<FloodModel>,
        history_concurrency: usize,
    ) -> Self {
        Self {
            geocoder,
            weather,
            model,
            history_concurrency: history_concurrency.max(1),
        }
    }

    /// Resolve a location name, translating geocoder absence into the
    /// caller-facing not-found error before any weather call is made.
    async fn locate(&self, location: &str) -> AppResult<Coordinates> {
        self.geocoder
            .resolve(location)
            .await?
            .ok_or_else(|| AppError::LocationNotFound(location.to_string()))
    }

    /// Fetch the trailing 30-day precipitation history for a location.
    ///
    /// Dates are anchored to the current UTC calendar day. Per-date
    /// failures are skipped, never fatal; an all-failure run yields an
    /// empty history, not an error.
    pub async fn precipitation_history(&self, location: &str) -> AppResult<PrecipitationHistory> {
        let coords = self.locate(location).await?;
        let today = Utc::now().date_naive();
        Ok(self.fetch_history(coords, today).await)
    }

    async fn fetch_history(&self, coords: Coordinates, today: NaiveDate) -> PrecipitationHistory {
        let semaphore = Arc::new(Semaphore::new(self.history_concurrency));
        let mut tasks = JoinSet::new();

        for date in history_dates(today) {
            let weather = self.weather.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                // The semaphore is never closed; acquire cannot fail.
                let _permit = semaphore.acquire_owned().await.ok();
                let result = weather.history_precipitation(coords, date).await;
                (date, result)
            });
        }

        let mut results = Vec::with_capacity(HISTORY_WINDOW_DAYS as usize);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(pair) => results.push(pair),
                Err(e) => tracing::error!("History fetch task failed to join: {}", e),
            }
        }

        collect_history(results)
    }

    /// Fetch tomorrow's forecast summary for a location.
    pub async fn forecast_summary(&self, location: &str) -> AppResult<ForecastSummary> {
        let coords = self.locate(location).await?;
        let response = self.weather.forecast(coords, FORECAST_WINDOW_DAYS).await?;
        summarize_tomorrow(response)?.ok_or(AppError::NoForecastData)
    }

    /// Assess flood risk for a rainfall measurement. No geocoding; pure
    /// computation over the pre-loaded artifact.
    pub fn assess(&self, rainfall_mm: f64) -> AppResult<RiskAssessment> {
        self.model.assess(rainfall_mm)
    }
}

/// The 30 calendar dates of the trailing window, most recent first
pub fn history_dates(today: NaiveDate) -> Vec<NaiveDate> {
    (0..HISTORY_WINDOW_DAYS)
        .map(|days_ago| today - Days::new(u64::from(days_ago)))
        .collect()
}

/// Merge per-date fetch results into a history, applying the
/// skip-on-failure policy and restoring most-recent-first order.
pub fn collect_history(results: Vec<(NaiveDate, AppResult<f64>)>) -> PrecipitationHistory {
    let mut history = PrecipitationHistory::default();

    for (date, result) in results {
        match result {
            Ok(rain_mm) => history.records.push(DailyPrecipitation { date, rain_mm }),
            Err(e) => {
                tracing::warn!("Skipping precipitation for {}: {}", date, e);
                history.skipped.push(SkippedDate {
                    date,
                    reason: e.to_string(),
                });
            }
        }
    }

    history.records.sort_by(|a, b| b.date.cmp(&a.date));
    history.skipped.sort_by(|a, b| b.date.cmp(&a.date));
    history
}

/// Extract the second forecast day (tomorrow) from a 2-day response.
///
/// Returns `Ok(None)` when the forecast structure is missing or too
/// short. A second day that is present but lacks a required field is a
/// malformed upstream response, classified as a transport-class error
/// rather than served as fabricated defaults.
pub fn summarize_tomorrow(response: ForecastResponse) -> AppResult<Option<ForecastSummary>> {
    let Some(block) = response.forecast else {
        return Ok(None);
    };
    let Some(entry) = block.forecastday.into_iter().nth(1) else {
        return Ok(None);
    };

    let date = entry.date;
    let day = entry.day;
    let missing =
        |field: &str| AppError::WeatherApi(format!("Forecast for {} is missing {}", date, field));

    Ok(Some(ForecastSummary {
        date,
        temp_c: day.avgtemp_c.ok_or_else(|| missing("day.avgtemp_c"))?,
        condition: day
            .condition
            .map(|c| c.text)
            .ok_or_else(|| missing("day.condition"))?,
        humidity_pct: day.avghumidity.ok_or_else(|| missing("day.avghumidity"))?,
        wind_kph: day.maxwind_kph.ok_or_else(|| missing("day.maxwind_kph"))?,
    }))
}
