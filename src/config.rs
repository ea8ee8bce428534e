use std::str::FromStr;

use chrono_tz::Tz;
use config::{Case, Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::geocode::Location;
use crate::units::UnitSystem;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Open-Meteo geocoding search endpoint
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,

    /// Open-Meteo forecast endpoint
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,

    /// IANA time zone used for day boundaries when a panel doesn't name one
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Initial unit system for new panels
    #[serde(default)]
    pub units: UnitSystem,

    /// Location shown by a freshly created panel
    #[serde(default = "default_location")]
    pub default_location: Location,

    /// Re-fetch from the provider when a panel toggles units instead of
    /// converting the stored canonical values locally
    #[serde(default)]
    pub refetch_on_unit_toggle: bool,

    #[serde(default)]
    pub geocoding: GeocodingConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub panels: PanelsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodingConfig {
    /// Number of ranked matches requested (only the first is used)
    #[serde(default = "default_result_count")]
    pub result_count: u8,

    /// Language for place names
    #[serde(default = "default_language")]
    pub language: String,

    /// How long a resolved query stays cached
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            result_count: default_result_count(),
            language: default_language(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    /// Days shown in the daily panel
    #[serde(default = "default_max_days")]
    pub max_days: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_days: default_max_days(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PanelsConfig {
    /// Panels untouched for this long are dropped
    #[serde(default = "default_idle_ttl_secs")]
    pub idle_ttl_secs: u64,

    /// How often idle panels are swept
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for PanelsConfig {
    fn default() -> Self {
        Self {
            idle_ttl_secs: default_idle_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_location() -> Location {
    Location {
        name: "Berlin, Germany".to_string(),
        latitude: 52.52,
        longitude: 13.405,
    }
}

fn default_result_count() -> u8 {
    5
}

fn default_language() -> String {
    "en".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_idle_ttl_secs() -> u64 {
    3600
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_max_days() -> usize {
    7
}

/// Check that a time zone name is a known IANA zone
pub fn validate_timezone(name: &str) -> Result<Tz, String> {
    Tz::from_str(name).map_err(|_| format!("Unknown time zone: {}", name))
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            .set_default("host", default_host())?
            .set_default("port", default_port())?
            .set_default("timezone", default_timezone())?
            .set_default("units", UnitSystem::default().as_str())?
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name("config.local").required(false))
            // SKYPANEL_DEFAULT_LOCATION__NAME -> default_location.name
            .add_source(
                Environment::with_prefix("SKYPANEL")
                    .prefix_separator("_")
                    .separator("__")
                    .convert_case(Case::Snake)
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_timezone(&self.timezone).map_err(ConfigError::Message)?;
        if self.display.max_days == 0 {
            return Err(ConfigError::Message(
                "display.max_days must be at least 1".to_string(),
            ));
        }
        if self.panels.idle_ttl_secs == 0 || self.panels.sweep_interval_secs == 0 {
            return Err(ConfigError::Message(
                "panels.idle_ttl_secs and panels.sweep_interval_secs must be at least 1"
                    .to_string(),
            ));
        }
        if self.geocoding.result_count == 0 {
            return Err(ConfigError::Message(
                "geocoding.result_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            geocoding_url: default_geocoding_url(),
            forecast_url: default_forecast_url(),
            timezone: default_timezone(),
            units: UnitSystem::default(),
            default_location: default_location(),
            refetch_on_unit_toggle: false,
            geocoding: GeocodingConfig::default(),
            display: DisplayConfig::default(),
            panels: PanelsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_timezone() {
        assert!(validate_timezone("Europe/Berlin").is_ok());
        assert!(validate_timezone("UTC").is_ok());
        assert!(validate_timezone("Mars/Olympus").is_err());
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_location.name, "Berlin, Germany");
        assert_eq!(config.units, UnitSystem::Metric);
        assert_eq!(config.display.max_days, 7);
        assert!(!config.refetch_on_unit_toggle);
    }

    #[test]
    fn test_zero_max_days_rejected() {
        let mut config = AppConfig::default();
        config.display.max_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_idle_ttl_rejected() {
        let mut config = AppConfig::default();
        config.panels.idle_ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "units": "imperial",
            "timezone": "America/Chicago",
            "default_location": { "name": "Chicago, Illinois, United States", "latitude": 41.85, "longitude": -87.65 }
        }))
        .unwrap();

        assert_eq!(config.units, UnitSystem::Imperial);
        assert_eq!(config.timezone, "America/Chicago");
        assert_eq!(config.default_location.latitude, 41.85);
        assert_eq!(config.port, 3000);
        assert_eq!(config.geocoding.result_count, 5);
        assert_eq!(config.panels.idle_ttl_secs, 3600);
    }
}
