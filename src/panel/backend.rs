use async_trait::async_trait;
use std::sync::Arc;

use crate::forecast::{ForecastError, ForecastService, NormalizedForecast};
use crate::geocode::{GeocodeError, GeocodeService, Location};
use crate::units::UnitSystem;

/// The two network boundaries a panel depends on
#[async_trait]
pub trait WeatherBackend: Send + Sync {
    /// Free text to the provider's top-ranked place
    async fn resolve(&self, query: &str) -> Result<Location, GeocodeError>;

    /// Canonical forecast for a place, day boundaries in `timezone`
    async fn forecast(
        &self,
        location: &Location,
        units: UnitSystem,
        timezone: &str,
    ) -> Result<NormalizedForecast, ForecastError>;
}

/// Open-Meteo geocoding + forecast
pub struct OpenMeteoBackend {
    geocode: Arc<GeocodeService>,
    forecast: Arc<ForecastService>,
}

impl OpenMeteoBackend {
    pub fn new(geocode: Arc<GeocodeService>, forecast: Arc<ForecastService>) -> Self {
        Self { geocode, forecast }
    }
}

#[async_trait]
impl WeatherBackend for OpenMeteoBackend {
    async fn resolve(&self, query: &str) -> Result<Location, GeocodeError> {
        self.geocode.resolve(query).await
    }

    async fn forecast(
        &self,
        location: &Location,
        units: UnitSystem,
        timezone: &str,
    ) -> Result<NormalizedForecast, ForecastError> {
        self.forecast
            .fetch_normalized(location, units, timezone)
            .await
    }
}
