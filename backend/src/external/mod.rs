//! External API integrations

pub mod geocode;
pub mod weather;

pub use geocode::GeocodingClient;
pub use weather::WeatherApiClient;
