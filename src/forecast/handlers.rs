use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use super::models::NormalizedForecast;
use super::service::ForecastError;
use crate::config::validate_timezone;
use crate::geocode::Location;
use crate::units::UnitSystem;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// IANA time zone for day boundaries; defaults to the configured zone
    pub timezone: Option<String>,
    /// Unit system requested from the provider; the response is canonical either way
    pub units: Option<UnitSystem>,
}

/// Canonical forecast (Celsius, m/s, mm) for a coordinate pair
///
/// GET /forecast?latitude=52.52&longitude=13.41&timezone=Europe/Berlin
pub async fn get_forecast(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<NormalizedForecast>, ForecastError> {
    let timezone = query
        .timezone
        .unwrap_or_else(|| state.config.timezone.clone());
    validate_timezone(&timezone).map_err(|_| ForecastError::InvalidTimezone(timezone.clone()))?;

    let location = Location {
        name: format!("{:.4}, {:.4}", query.latitude, query.longitude),
        latitude: query.latitude,
        longitude: query.longitude,
    };
    let units = query.units.unwrap_or(state.config.units);

    let forecast = state
        .forecast_service
        .fetch_normalized(&location, units, &timezone)
        .await?;
    Ok(Json(forecast))
}
