//! Weather data models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily precipitation total for a single calendar date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyPrecipitation {
    pub date: NaiveDate,
    pub rain_mm: f64,
}

/// A date whose fetch failed and was dropped from the history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedDate {
    pub date: NaiveDate,
    pub reason: String,
}

/// Best-effort 30-day precipitation history.
///
/// Per-date failures do not abort the collection; they are recorded in
/// `skipped` so callers can tell a short history from a complete one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrecipitationHistory {
    pub records: Vec<DailyPrecipitation>,
    pub skipped: Vec<SkippedDate>,
}

/// Aggregated forecast for a single future day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastSummary {
    pub date: NaiveDate,
    pub temp_c: f64,
    pub condition: String,
    pub humidity_pct: f64,
    pub wind_kph: f64,
}
