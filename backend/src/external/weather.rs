//! Weather API client for historical precipitation and forecasts
//!
//! Integrates with WeatherAPI (weatherapi.com) history.json and
//! forecast.json endpoints.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use shared::Coordinates;

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};

/// WeatherAPI client
#[derive(Clone)]
pub struct WeatherApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// Top-level response shape shared by history.json and forecast.json
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub forecast: Option<ForecastBlock>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastBlock {
    #[serde(default)]
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub day: DaySummary,
}

/// Daily aggregates. All fields are optional upstream; absent
/// precipitation defaults to 0 at the extraction site.
#[derive(Debug, Deserialize)]
pub struct DaySummary {
    pub totalprecip_mm: Option<f64>,
    pub avgtemp_c: Option<f64>,
    pub avghumidity: Option<f64>,
    pub maxwind_kph: Option<f64>,
    pub condition: Option<Condition>,
}

#[derive(Debug, Deserialize)]
pub struct Condition {
    pub text: String,
}

impl WeatherApiClient {
    /// Create a new WeatherApiClient
    pub fn new(config: &WeatherConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        })
    }

    /// Create a new WeatherApiClient with custom base URL (for testing)
    pub fn with_base_url(api_key: String, base_url: String) -> AppResult<Self> {
        Self::new(&WeatherConfig {
            base_url,
            api_key,
            request_timeout_secs: 5,
            history_concurrency: 8,
        })
    }

    /// Fetch the precipitation total for a single past date.
    ///
    /// Returns the `totalprecip_mm` of the single forecast-day entry in
    /// the response; an absent value counts as 0. A missing entry or a
    /// non-2xx status is an error the caller may choose to swallow.
    pub async fn history_precipitation(
        &self,
        coords: Coordinates,
        date: NaiveDate,
    ) -> AppResult<f64> {
        let url = format!("{}/history.json", self.base_url);
        let q = coords.to_string();
        let dt = date.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", q.as_str()),
                ("dt", dt.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::WeatherApi(format!("History request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::WeatherApi(format!(
                "History request for {} returned status {}",
                date,
                response.status()
            )));
        }

        let data: ForecastResponse = response
            .json()
            .await
            .map_err(|e| AppError::WeatherApi(format!("Failed to parse history response: {}", e)))?;

        extract_daily_precipitation(&data).ok_or_else(|| {
            AppError::WeatherApi(format!("History response for {} has no forecast day", date))
        })
    }

    /// Fetch a multi-day forecast window starting today.
    pub async fn forecast(&self, coords: Coordinates, days: u8) -> AppResult<ForecastResponse> {
        let url = format!("{}/forecast.json", self.base_url);
        let q = coords.to_string();
        let days = days.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", q.as_str()),
                ("days", days.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::WeatherApi(format!("Forecast request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::WeatherApi(format!(
                "Forecast request returned status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::WeatherApi(format!("Failed to parse forecast response: {}", e)))
    }
}

/// Pull the precipitation total out of a single-date history response.
/// `None` means the response carried no forecast-day entry at all.
pub fn extract_daily_precipitation(data: &ForecastResponse) -> Option<f64> {
    let day = &data.forecast.as_ref()?.forecastday.first()?.day;
    Some(day.totalprecip_mm.unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_precipitation_present() {
        let data: ForecastResponse = serde_json::from_str(
            r#"{"forecast":{"forecastday":[{"date":"2026-08-29","day":{"totalprecip_mm":12.4}}]}}"#,
        )
        .unwrap();
        assert_eq!(extract_daily_precipitation(&data), Some(12.4));
    }

    #[test]
    fn test_extract_precipitation_absent_defaults_to_zero() {
        let data: ForecastResponse = serde_json::from_str(
            r#"{"forecast":{"forecastday":[{"date":"2026-08-29","day":{}}]}}"#,
        )
        .unwrap();
        assert_eq!(extract_daily_precipitation(&data), Some(0.0));
    }

    #[test]
    fn test_extract_precipitation_missing_forecastday() {
        let data: ForecastResponse =
            serde_json::from_str(r#"{"forecast":{"forecastday":[]}}"#).unwrap();
        assert_eq!(extract_daily_precipitation(&data), None);

        let data: ForecastResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(extract_daily_precipitation(&data), None);
    }
}
