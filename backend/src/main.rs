//! Flood Monitoring Platform - server binary

use std::{net::SocketAddr, sync::Arc, time::Duration};

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flood_server::external::{GeocodingClient, WeatherApiClient};
use flood_server::services::FloodModel;
use flood_server::{create_app, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flood_server=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Flood Monitoring Server");
    tracing::info!("Environment: {}", config.environment);

    // Load the fitted model artifact; a bad artifact refuses startup
    let model = FloodModel::load(&config.model.artifact_path)?;
    tracing::info!("Loaded flood model from {}", config.model.artifact_path);

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.environment == "development" {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    // Outbound clients, built once and shared
    let geocoder = GeocodingClient::new(&config.geocoding)?;
    let weather = WeatherApiClient::new(&config.weather)?;

    // Create application state
    let state = AppState {
        db: db_pool,
        config: Arc::new(config.clone()),
        model: Arc::new(model),
        geocoder,
        weather,
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
