//! Flood pipeline tests
//!
//! Exercises the history window, the skip-on-failure merge, and the
//! tomorrow-extraction rule against fixture responses.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use proptest::prelude::*;
use tokio::net::TcpListener;

use flood_server::error::AppError;
use flood_server::external::geocode::GeocodingClient;
use flood_server::external::weather::{ForecastResponse, WeatherApiClient};
use flood_server::services::flood::{
    collect_history, history_dates, summarize_tomorrow, FloodService, HISTORY_WINDOW_DAYS,
};
use flood_server::services::model::{
    ClassifierParams, FloodModel, FloodModelArtifact, ScalerParams,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_window_is_thirty_days_most_recent_first() {
    let today = date(2026, 8, 30);
    let dates = history_dates(today);

    assert_eq!(dates.len(), HISTORY_WINDOW_DAYS as usize);
    assert_eq!(dates[0], today);
    assert!(dates.windows(2).all(|w| w[0] > w[1]));
    assert_eq!(*dates.last().unwrap(), date(2026, 8, 1));
}

#[test]
fn test_five_failed_dates_yield_twenty_five_records() {
    let today = date(2026, 8, 30);
    let results: Vec<_> = history_dates(today)
        .into_iter()
        .enumerate()
        .map(|(i, d)| {
            // Fail every sixth date
            if i % 6 == 5 {
                (d, Err(AppError::WeatherApi("status 500".into())))
            } else {
                (d, Ok(i as f64))
            }
        })
        .collect();

    let history = collect_history(results);
    assert_eq!(history.records.len(), 25);
    assert_eq!(history.skipped.len(), 5);

    // Still ordered most-recent-first after the merge
    assert!(history
        .records
        .windows(2)
        .all(|w| w[0].date > w[1].date));

    // Skipped dates never appear among the records
    for skipped in &history.skipped {
        assert!(history.records.iter().all(|r| r.date != skipped.date));
    }
}

#[test]
fn test_all_failures_is_empty_history_not_error() {
    let today = date(2026, 8, 30);
    let results: Vec<_> = history_dates(today)
        .into_iter()
        .map(|d| (d, Err(AppError::WeatherApi("timeout".into()))))
        .collect();

    let history = collect_history(results);
    assert!(history.records.is_empty());
    assert_eq!(history.skipped.len(), 30);
}

#[test]
fn test_forecast_second_day_mapping() {
    let response: ForecastResponse = serde_json::from_str(
        r#"{
            "location": {"name": "Hà Nội"},
            "forecast": {"forecastday": [
                {"date": "2026-08-30", "day": {
                    "avgtemp_c": 31.2, "condition": {"text": "Sunny"},
                    "avghumidity": 58.0, "maxwind_kph": 9.7, "totalprecip_mm": 0.0
                }},
                {"date": "2026-08-31", "day": {
                    "avgtemp_c": 26.8, "condition": {"text": "Moderate rain"},
                    "avghumidity": 89.0, "maxwind_kph": 18.4, "totalprecip_mm": 14.2
                }}
            ]}
        }"#,
    )
    .unwrap();

    let summary = summarize_tomorrow(response).unwrap().unwrap();
    assert_eq!(summary.date, date(2026, 8, 31));
    assert_eq!(summary.temp_c, 26.8);
    assert_eq!(summary.condition, "Moderate rain");
    assert_eq!(summary.humidity_pct, 89.0);
    assert_eq!(summary.wind_kph, 18.4);
}

#[test]
fn test_forecast_with_single_day_is_no_data() {
    let response: ForecastResponse = serde_json::from_str(
        r#"{"forecast": {"forecastday": [
            {"date": "2026-08-30", "day": {"avgtemp_c": 31.2}}
        ]}}"#,
    )
    .unwrap();
    assert!(summarize_tomorrow(response).unwrap().is_none());
}

#[test]
fn test_forecast_without_forecast_block_is_no_data() {
    let response: ForecastResponse = serde_json::from_str(r#"{"current": {}}"#).unwrap();
    assert!(summarize_tomorrow(response).unwrap().is_none());
}

#[test]
fn test_forecast_with_empty_second_day_is_upstream_error() {
    // A provider response whose second entry carries no day aggregates
    // must surface as an upstream data error, never as zeroed output.
    let response: ForecastResponse = serde_json::from_str(
        r#"{"forecast": {"forecastday": [
            {"date": "2026-08-30", "day": {
                "avgtemp_c": 31.2, "condition": {"text": "Sunny"},
                "avghumidity": 58.0, "maxwind_kph": 9.7, "totalprecip_mm": 0.0
            }},
            {"date": "2026-08-31", "day": {}}
        ]}}"#,
    )
    .unwrap();

    let err = summarize_tomorrow(response).unwrap_err();
    assert!(matches!(err, AppError::WeatherApi(_)));
    assert!(err.to_string().contains("2026-08-31"));
}

/// Serve a stub router on an ephemeral local port, returning its base URL.
async fn spawn_stub(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn test_model() -> Arc<FloodModel> {
    let artifact = FloodModelArtifact {
        feature_names: vec!["rainfall_mm".to_string()],
        scaler: ScalerParams {
            mean: vec![92.4],
            scale: vec![61.8],
        },
        classifier: ClassifierParams {
            coefficients: vec![3.2],
            intercept: -0.8,
        },
    };
    Arc::new(FloodModel::from_artifact(artifact).unwrap())
}

#[tokio::test]
async fn test_unknown_location_fails_before_any_weather_request() {
    // Geocoder stub: no match for anything.
    let geocoder_url = spawn_stub(
        Router::new().route("/search", get(|| async { Json(serde_json::json!([])) })),
    )
    .await;

    // Weather stub: counts every request it receives.
    let weather_hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&weather_hits);
    let weather_url = spawn_stub(Router::new().fallback(move || {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Json(serde_json::json!({}))
        }
    }))
    .await;

    let geocoder = GeocodingClient::with_base_url(geocoder_url).unwrap();
    let weather = WeatherApiClient::with_base_url("test-key".to_string(), weather_url).unwrap();
    let service = FloodService::new(geocoder, weather, test_model(), 8);

    let err = service
        .precipitation_history("Nonexistent Hamlet")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::LocationNotFound(_)));

    let err = service
        .forecast_summary("Nonexistent Hamlet")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::LocationNotFound(_)));

    assert_eq!(weather_hits.load(Ordering::SeqCst), 0);
}

proptest! {
    /// The merge never invents records: every record's date comes from
    /// the input, capped at the window length, each date unique.
    #[test]
    fn prop_collect_history_preserves_dates(failures in proptest::collection::vec(any::<bool>(), 30)) {
        let today = date(2026, 8, 30);
        let dates = history_dates(today);
        let results: Vec<_> = dates
            .iter()
            .zip(&failures)
            .map(|(&d, &fail)| {
                if fail {
                    (d, Err(AppError::WeatherApi("status 500".into())))
                } else {
                    (d, Ok(1.5))
                }
            })
            .collect();

        let history = collect_history(results);
        let failed = failures.iter().filter(|&&f| f).count();

        prop_assert_eq!(history.records.len() + history.skipped.len(), 30);
        prop_assert_eq!(history.skipped.len(), failed);
        prop_assert!(history.records.len() <= HISTORY_WINDOW_DAYS as usize);
        for record in &history.records {
            prop_assert!(dates.contains(&record.date));
        }
    }
}
