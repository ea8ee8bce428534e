use axum::http::StatusCode;
use reqwest::Client;
use thiserror::Error;

use super::models::*;
use super::normalize::normalize;
use crate::error::{provider_reason, HttpError};
use crate::geocode::Location;
use crate::impl_into_response;
use crate::units::UnitSystem;

const HOURLY_FIELDS: &str =
    "temperature_2m,relativehumidity_2m,precipitation,weathercode,windspeed_10m";
const DAILY_FIELDS: &str = "weathercode,temperature_2m_max,temperature_2m_min,precipitation_sum";

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Failed to reach forecast service: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Forecast API error: {0}")]
    ApiError(String),

    #[error("Unknown time zone: {0}")]
    InvalidTimezone(String),
}

impl HttpError for ForecastError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::RequestError(_) | Self::ApiError(_) => StatusCode::BAD_GATEWAY,
            Self::InvalidTimezone(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::RequestError(_) => Some("REQUEST_ERROR"),
            Self::ApiError(_) => Some("PROVIDER_ERROR"),
            Self::InvalidTimezone(_) => Some("INVALID_TIMEZONE"),
        }
    }
}

impl_into_response!(ForecastError);

/// Forecast fetcher backed by the Open-Meteo forecast API
pub struct ForecastService {
    client: Client,
    base_url: String,
}

impl ForecastService {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    /// Current, hourly and daily series in one round trip.
    ///
    /// `timezone` decides where the provider draws day boundaries; the
    /// provider pre-converts temperature and wind speed into `units`.
    pub async fn fetch(
        &self,
        location: &Location,
        units: UnitSystem,
        timezone: &str,
    ) -> Result<RawForecastPayload, ForecastError> {
        tracing::debug!(
            location = %location.name,
            lat = %location.latitude,
            lon = %location.longitude,
            units = %units,
            timezone = %timezone,
            "Fetching forecast"
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("timezone", timezone.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("current_weather", "true".to_string()),
                ("temperature_unit", units.temperature_param().to_string()),
                ("windspeed_unit", units.windspeed_param().to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = %status, "Received forecast response");

        if !status.is_success() {
            return Err(ForecastError::ApiError(provider_reason(response).await));
        }

        Ok(response.json().await?)
    }

    /// Fetch and convert straight into the canonical store
    pub async fn fetch_normalized(
        &self,
        location: &Location,
        units: UnitSystem,
        timezone: &str,
    ) -> Result<NormalizedForecast, ForecastError> {
        let payload = self.fetch(location, units, timezone).await?;
        let forecast = normalize(&payload, units);

        tracing::info!(
            location = %location.name,
            hourly = forecast.hourly.len(),
            daily = forecast.daily.len(),
            "Forecast fetched"
        );

        Ok(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn berlin() -> Location {
        Location {
            name: "Berlin, Land Berlin, Germany".to_string(),
            latitude: 52.52,
            longitude: 13.41,
        }
    }

    fn forecast_body(temperature: f64, windspeed: f64) -> serde_json::Value {
        serde_json::json!({
            "timezone": "Europe/Berlin",
            "current_weather": {
                "temperature": temperature,
                "windspeed": windspeed,
                "weathercode": 0,
                "time": "2025-08-05T13:00"
            },
            "hourly": {
                "time": ["2025-08-05T13:00"],
                "temperature_2m": [temperature],
                "relativehumidity_2m": [55],
                "precipitation": [0.0],
                "weathercode": [0],
                "windspeed_10m": [windspeed]
            },
            "daily": {
                "time": ["2025-08-05"],
                "weathercode": [0],
                "temperature_2m_max": [temperature],
                "temperature_2m_min": [temperature],
                "precipitation_sum": [0.0]
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_sends_full_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "52.52"))
            .and(query_param("longitude", "13.41"))
            .and(query_param("timezone", "Europe/Berlin"))
            .and(query_param("hourly", HOURLY_FIELDS))
            .and(query_param("daily", DAILY_FIELDS))
            .and(query_param("current_weather", "true"))
            .and(query_param("temperature_unit", "fahrenheit"))
            .and(query_param("windspeed_unit", "mph"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(68.0, 22.3694)))
            .expect(1)
            .mount(&server)
            .await;

        let service = ForecastService::new(Client::new(), &format!("{}/v1/forecast", server.uri()));
        let payload = service
            .fetch(&berlin(), UnitSystem::Imperial, "Europe/Berlin")
            .await
            .unwrap();

        assert_eq!(payload.current_weather.unwrap().temperature, Some(68.0));
    }

    #[tokio::test]
    async fn test_fetch_normalized_is_canonical_for_both_unit_systems() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("temperature_unit", "celsius"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(20.0, 36.0)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("temperature_unit", "fahrenheit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(68.0, 22.3694)))
            .mount(&server)
            .await;

        let service = ForecastService::new(Client::new(), &server.uri());
        let metric = service
            .fetch_normalized(&berlin(), UnitSystem::Metric, "UTC")
            .await
            .unwrap();
        let imperial = service
            .fetch_normalized(&berlin(), UnitSystem::Imperial, "UTC")
            .await
            .unwrap();

        let m = metric.current.unwrap();
        let i = imperial.current.unwrap();
        assert!((m.temperature_c.unwrap() - i.temperature_c.unwrap()).abs() < 1e-6);
        assert!((m.wind_speed_mps.unwrap() - i.wind_speed_mps.unwrap()).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": true,
                "reason": "Latitude must be in range of -90 to 90°."
            })))
            .mount(&server)
            .await;

        let service = ForecastService::new(Client::new(), &server.uri());
        let err = service
            .fetch(&berlin(), UnitSystem::Metric, "UTC")
            .await
            .unwrap_err();

        assert!(matches!(err, ForecastError::ApiError(ref r) if r.contains("Latitude")));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_fetch_server_error_without_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let service = ForecastService::new(Client::new(), &server.uri());
        let err = service
            .fetch(&berlin(), UnitSystem::Metric, "UTC")
            .await
            .unwrap_err();

        assert!(matches!(err, ForecastError::ApiError(ref r) if r.contains("503")));
    }

    #[tokio::test]
    async fn test_fetch_tolerates_partial_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "timezone": "UTC",
                "daily": { "time": [] }
            })))
            .mount(&server)
            .await;

        let service = ForecastService::new(Client::new(), &server.uri());
        let forecast = service
            .fetch_normalized(&berlin(), UnitSystem::Metric, "UTC")
            .await
            .unwrap();

        assert!(forecast.current.is_none());
        assert!(forecast.hourly.is_empty());
        assert!(forecast.daily.is_empty());
    }
}
