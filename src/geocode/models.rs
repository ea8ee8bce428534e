use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// Geocoding API Response (Internal)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    /// Absent entirely when nothing matched
    #[serde(default)]
    pub results: Vec<GeocodingResult>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodingResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub admin1: Option<String>,
    pub country: Option<String>,
}

impl GeocodingResult {
    /// "Name, Region, Country", skipping whichever parts are missing or blank
    pub fn display_name(&self) -> String {
        [
            Some(self.name.as_str()),
            self.admin1.as_deref(),
            self.country.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

// ============================================================================
// Domain Model
// ============================================================================

/// A resolved place. Replaced wholesale, never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<GeocodingResult> for Location {
    fn from(result: GeocodingResult) -> Self {
        Location {
            name: result.display_name(),
            latitude: result.latitude,
            longitude: result.longitude,
        }
    }
}
