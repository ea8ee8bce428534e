use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::lenient;

// ============================================================================
// Forecast API Response (Internal)
// Parallel arrays exactly as Open-Meteo sends them. Every field is optional
// so a malformed payload degrades instead of failing to parse.
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawForecastPayload {
    #[serde(default, deserialize_with = "lenient::value")]
    pub timezone: Option<String>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub current_weather: Option<RawCurrentWeather>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub hourly: Option<RawHourly>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub daily: Option<RawDaily>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub hourly_units: Option<RawSeriesUnits>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub daily_units: Option<RawSeriesUnits>,
}

/// Unit labels the provider reports per series, e.g. `"mm"` or `"inch"`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSeriesUnits {
    #[serde(default, deserialize_with = "lenient::value")]
    pub precipitation: Option<String>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub precipitation_sum: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCurrentWeather {
    #[serde(default, deserialize_with = "lenient::value")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub windspeed: Option<f64>,
    #[serde(default, deserialize_with = "lenient::value")]
    pub weathercode: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHourly {
    #[serde(default, deserialize_with = "lenient::series")]
    pub time: Vec<Option<String>>,
    #[serde(default, deserialize_with = "lenient::series")]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(
        default,
        alias = "relative_humidity_2m",
        deserialize_with = "lenient::series"
    )]
    pub relativehumidity_2m: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "lenient::series")]
    pub precipitation: Vec<Option<f64>>,
    #[serde(default, alias = "weather_code", deserialize_with = "lenient::series")]
    pub weathercode: Vec<Option<f64>>,
    #[serde(default, alias = "wind_speed_10m", deserialize_with = "lenient::series")]
    pub windspeed_10m: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDaily {
    #[serde(default, deserialize_with = "lenient::series")]
    pub time: Vec<Option<String>>,
    #[serde(default, alias = "weather_code", deserialize_with = "lenient::series")]
    pub weathercode: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "lenient::series")]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "lenient::series")]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "lenient::series")]
    pub precipitation_sum: Vec<Option<f64>>,
}

// ============================================================================
// Canonical Store
// Celsius, metres per second and millimetres regardless of what was requested.
// `None` means the provider gave nothing usable for that field.
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CurrentConditions {
    pub temperature_c: Option<f64>,
    pub wind_speed_mps: Option<f64>,
    pub weather_code: Option<i32>,
    /// Local time in the forecast's time zone
    pub observed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HourlyRecord {
    pub time: NaiveDateTime,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub weather_code: Option<i32>,
    pub wind_speed_mps: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub max_c: Option<f64>,
    pub min_c: Option<f64>,
    pub precipitation_sum_mm: Option<f64>,
    pub weather_code: Option<i32>,
}

/// Everything one successful fetch produces, replaced as a unit
#[derive(Debug, Clone, PartialEq, Default, Serialize, ToSchema)]
pub struct NormalizedForecast {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    pub current: Option<CurrentConditions>,
    /// Provider order, never re-sorted
    pub hourly: Vec<HourlyRecord>,
    /// Strictly increasing dates
    pub daily: Vec<DailyRecord>,
}

impl NormalizedForecast {
    /// Hourly records falling on `date`, in stored order
    pub fn hours_on(&self, date: NaiveDate) -> impl Iterator<Item = &HourlyRecord> {
        self.hourly.iter().filter(move |h| h.time.date() == date)
    }
}
