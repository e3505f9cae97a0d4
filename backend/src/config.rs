//! Configuration management for the Flood Monitoring Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with FLOOD_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Weather API configuration
    pub weather: WeatherConfig,

    /// Geocoding service configuration
    pub geocoding: GeocodingConfig,

    /// Fitted model artifact configuration
    pub model: ModelConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiration in seconds
    pub refresh_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// WeatherAPI endpoint
    pub base_url: String,

    /// WeatherAPI key
    pub api_key: String,

    /// Per-request timeout in seconds for outbound weather calls
    pub request_timeout_secs: u64,

    /// Maximum in-flight requests during the 30-day history fan-out
    pub history_concurrency: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodingConfig {
    /// Nominatim endpoint
    pub base_url: String,

    /// Per-request timeout in seconds for geocoding calls
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Path to the fitted scaler + classifier artifact (JSON)
    pub artifact_path: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("FLOOD_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.access_token_expiry", 3600)?
            .set_default("jwt.refresh_token_expiry", 604800)?
            .set_default("weather.base_url", "http://api.weatherapi.com/v1")?
            .set_default("weather.request_timeout_secs", 5)?
            .set_default("weather.history_concurrency", 8)?
            .set_default("geocoding.base_url", "https://nominatim.openstreetmap.org")?
            .set_default("geocoding.request_timeout_secs", 10)?
            .set_default("model.artifact_path", "model/flood_model.json")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FLOOD_ prefix)
            .add_source(
                Environment::with_prefix("FLOOD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "0.0.0.0".to_string(),
        }
    }
}
