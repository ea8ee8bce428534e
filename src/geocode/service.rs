use axum::http::StatusCode;
use reqwest::Client;
use thiserror::Error;

use super::models::*;
use crate::cache::{normalize_cache_key, GeoCache};
use crate::error::{provider_reason, HttpError};
use crate::impl_into_response;

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("Search text is empty")]
    EmptyQuery,

    #[error("Place not found: {0}")]
    NotFound(String),

    #[error("Failed to reach geocoding service: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Geocoding failed: {0}")]
    ApiError(String),
}

impl GeocodeError {
    /// Transport failures and non-2xx answers
    pub fn is_provider_error(&self) -> bool {
        matches!(self, Self::RequestError(_) | Self::ApiError(_))
    }
}

impl HttpError for GeocodeError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::EmptyQuery => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RequestError(_) | Self::ApiError(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::EmptyQuery => Some("EMPTY_QUERY"),
            Self::NotFound(_) => Some("PLACE_NOT_FOUND"),
            Self::RequestError(_) => Some("REQUEST_ERROR"),
            Self::ApiError(_) => Some("PROVIDER_ERROR"),
        }
    }
}

impl_into_response!(GeocodeError);

/// Place resolver backed by the Open-Meteo geocoding API
pub struct GeocodeService {
    client: Client,
    base_url: String,
    result_count: u8,
    language: String,
    cache: GeoCache,
}

impl GeocodeService {
    pub fn new(
        client: Client,
        base_url: &str,
        result_count: u8,
        language: &str,
        cache: GeoCache,
    ) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            result_count,
            language: language.to_string(),
            cache,
        }
    }

    /// Resolve free text to the provider's top-ranked place.
    /// Results are cached by normalized query text.
    pub async fn resolve(&self, query: &str) -> Result<Location, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }

        let cache_key = normalize_cache_key(query);
        if let Some(cached) = self.cache.get(&cache_key) {
            tracing::debug!(query = %query, "Geocoding cache hit");
            return Ok(cached);
        }

        tracing::debug!(query = %query, "Geocoding cache miss");

        let count = self.result_count.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("name", query),
                ("count", count.as_str()),
                ("language", self.language.as_str()),
                ("format", "json"),
            ])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = %status, "Received geocoding response");

        if !status.is_success() {
            return Err(GeocodeError::ApiError(provider_reason(response).await));
        }

        let body: GeocodingResponse = response.json().await?;

        // Provider ranking is authoritative: first match wins
        let location: Location = body
            .results
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NotFound(query.to_string()))?
            .into();

        tracing::info!(
            query = %query,
            name = %location.name,
            lat = %location.latitude,
            lon = %location.longitude,
            "Resolved place"
        );

        self.cache.insert(cache_key, location.clone());
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service_for(server: &MockServer) -> GeocodeService {
        GeocodeService::new(
            Client::new(),
            &format!("{}/v1/search", server.uri()),
            5,
            "en",
            crate::cache::create_geo_cache(Duration::from_secs(60)),
        )
    }

    fn berlin_body() -> serde_json::Value {
        serde_json::json!({
            "results": [
                {
                    "name": "Berlin",
                    "latitude": 52.52437,
                    "longitude": 13.41053,
                    "admin1": "Land Berlin",
                    "country": "Germany"
                },
                {
                    "name": "Berlin",
                    "latitude": 39.79122,
                    "longitude": -74.92905,
                    "admin1": "New Jersey",
                    "country": "United States"
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_resolve_takes_first_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Berlin"))
            .and(query_param("count", "5"))
            .and(query_param("language", "en"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(berlin_body()))
            .mount(&server)
            .await;

        let location = service_for(&server).resolve("Berlin").await.unwrap();

        assert_eq!(location.name, "Berlin, Land Berlin, Germany");
        assert!((location.latitude - 52.52).abs() < 0.01);
        assert!((location.longitude - 13.40).abs() < 0.02);
    }

    #[tokio::test]
    async fn test_resolve_no_results_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "generationtime_ms": 0.3 })),
            )
            .mount(&server)
            .await;

        let err = service_for(&server)
            .resolve("zzzznotaplace")
            .await
            .unwrap_err();

        assert!(matches!(err, GeocodeError::NotFound(ref q) if q == "zzzznotaplace"));
        assert!(!err.is_provider_error());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_resolve_empty_results_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": [] })),
            )
            .mount(&server)
            .await;

        let err = service_for(&server).resolve("nowhere").await.unwrap_err();
        assert!(matches!(err, GeocodeError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_resolve_server_error_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": true,
                "reason": "Parameter count must be between 1 and 100."
            })))
            .mount(&server)
            .await;

        let err = service_for(&server).resolve("Berlin").await.unwrap_err();

        assert!(err.is_provider_error());
        assert_eq!(err.error_code(), Some("PROVIDER_ERROR"));
        assert!(err.to_string().contains("between 1 and 100"));
    }

    #[tokio::test]
    async fn test_resolve_unreachable_is_provider_error() {
        let service = GeocodeService::new(
            Client::new(),
            "http://127.0.0.1:9/v1/search",
            5,
            "en",
            crate::cache::create_geo_cache(Duration::from_secs(60)),
        );

        let err = service.resolve("Berlin").await.unwrap_err();
        assert!(matches!(err, GeocodeError::RequestError(_)));
        assert!(err.is_provider_error());
    }

    #[tokio::test]
    async fn test_resolve_blank_query_skips_provider() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(berlin_body()))
            .expect(0)
            .mount(&server)
            .await;

        let err = service_for(&server).resolve("   ").await.unwrap_err();
        assert!(matches!(err, GeocodeError::EmptyQuery));
    }

    #[tokio::test]
    async fn test_resolve_uses_cache_for_repeat_queries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(berlin_body()))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server);
        let first = service.resolve("Berlin").await.unwrap();
        let second = service.resolve("  berlin ").await.unwrap();

        assert_eq!(first, second);
    }
}
