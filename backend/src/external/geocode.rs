//! Geocoding client for resolving location names to coordinates
//!
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use shared::Coordinates;

use crate::config::GeocodingConfig;
use crate::error::{AppError, AppResult};

/// Country qualifier appended to every query. The deployment serves a
/// single country; this is a domain constraint, not a config knob.
const COUNTRY_QUALIFIER: &str = "Vietnam";

const USER_AGENT: &str = "flood-monitoring-backend/0.1 (flood_monitoring_app)";

/// Nominatim geocoding client
#[derive(Clone)]
pub struct GeocodingClient {
    client: Client,
    base_url: String,
}

/// Nominatim search result entry. Coordinates come back as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl GeocodingClient {
    /// Create a new GeocodingClient
    pub fn new(config: &GeocodingConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Create a new GeocodingClient with custom base URL (for testing)
    pub fn with_base_url(base_url: String) -> AppResult<Self> {
        Self::new(&GeocodingConfig {
            base_url,
            request_timeout_secs: 10,
        })
    }

    /// Resolve a location name to coordinates.
    ///
    /// Returns `Ok(None)` when the geocoder has no match; that is a
    /// data-absence signal, not a transport failure. One network call
    /// per invocation, no caching, no retry.
    pub async fn resolve(&self, location: &str) -> AppResult<Option<Coordinates>> {
        let url = format!("{}/search", self.base_url);
        let query = format!("{}, {}", location, COUNTRY_QUALIFIER);

        let response = self
            .client
            .get(&url)
            .query(&[("q", query.as_str()), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| AppError::Geocoding(format!("Geocoding request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Geocoding(format!(
                "Geocoding service returned status {}",
                response.status()
            )));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| AppError::Geocoding(format!("Failed to parse geocoding response: {}", e)))?;

        let Some(place) = places.into_iter().next() else {
            tracing::debug!("No geocoding match for {:?}", location);
            return Ok(None);
        };

        let coords = parse_place(&place)?;
        tracing::debug!("Resolved {:?} to {}", location, coords);
        Ok(Some(coords))
    }
}

fn parse_place(place: &NominatimPlace) -> AppResult<Coordinates> {
    let latitude = place
        .lat
        .parse::<f64>()
        .map_err(|e| AppError::Geocoding(format!("Invalid latitude in response: {}", e)))?;
    let longitude = place
        .lon
        .parse::<f64>()
        .map_err(|e| AppError::Geocoding(format!("Invalid longitude in response: {}", e)))?;
    Ok(Coordinates::new(latitude, longitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_place_valid() {
        let place = NominatimPlace {
            lat: "21.0283334".to_string(),
            lon: "105.8540410".to_string(),
        };
        let coords = parse_place(&place).unwrap();
        assert!((coords.latitude - 21.0283334).abs() < 1e-9);
        assert!((coords.longitude - 105.8540410).abs() < 1e-9);
    }

    #[test]
    fn test_parse_place_malformed_is_transport_error() {
        let place = NominatimPlace {
            lat: "not-a-number".to_string(),
            lon: "105.0".to_string(),
        };
        assert!(matches!(
            parse_place(&place),
            Err(AppError::Geocoding(_))
        ));
    }

    #[test]
    fn test_empty_result_deserializes() {
        let places: Vec<NominatimPlace> = serde_json::from_str("[]").unwrap();
        assert!(places.is_empty());
    }
}
