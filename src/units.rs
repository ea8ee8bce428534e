use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Display unit system, global to a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// The other unit system
    pub fn toggled(self) -> Self {
        match self {
            Self::Metric => Self::Imperial,
            Self::Imperial => Self::Metric,
        }
    }

    /// Value of the forecast API `temperature_unit` parameter
    pub fn temperature_param(self) -> &'static str {
        match self {
            Self::Metric => "celsius",
            Self::Imperial => "fahrenheit",
        }
    }

    /// Value of the forecast API `windspeed_unit` parameter
    pub fn windspeed_param(self) -> &'static str {
        match self {
            Self::Metric => "kmh",
            Self::Imperial => "mph",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub mod temperature {
    pub fn f2c(temp_f: f64) -> f64 {
        (temp_f - 32.0) * 5.0 / 9.0
    }

    pub fn c2f(temp_c: f64) -> f64 {
        temp_c * 9.0 / 5.0 + 32.0
    }

    #[test]
    fn test_temperature() {
        assert_eq!(f2c(212.0), 100.0);
        assert_eq!(f2c(32.0), 0.0);
        assert_eq!(c2f(0.0), 32.0);
        assert_eq!(c2f(100.0), 212.0);
        assert_eq!(c2f(20.0), 68.0);
    }
}

pub mod speed {
    const KMH_PER_MPS: f64 = 3.6;
    const MPH_PER_MPS: f64 = 2.23694;

    pub fn mps2kmh(mps: f64) -> f64 {
        mps * KMH_PER_MPS
    }

    pub fn kmh2mps(kmh: f64) -> f64 {
        kmh / KMH_PER_MPS
    }

    pub fn mps2mph(mps: f64) -> f64 {
        mps * MPH_PER_MPS
    }

    pub fn mph2mps(mph: f64) -> f64 {
        mph / MPH_PER_MPS
    }

    #[test]
    fn test_speed() {
        assert_eq!(mps2kmh(10.0), 36.0);
        assert_eq!(kmh2mps(36.0), 10.0);
        assert!((mps2mph(10.0) - 22.3694).abs() < 1e-9);
        assert!((mph2mps(22.3694) - 10.0).abs() < 1e-9);
    }
}

pub mod precipitation {
    const MM_PER_INCH: f64 = 25.4;

    pub fn mm2in(mm: f64) -> f64 {
        mm / MM_PER_INCH
    }

    pub fn in2mm(inches: f64) -> f64 {
        inches * MM_PER_INCH
    }

    #[test]
    fn test_precipitation() {
        assert_eq!(mm2in(25.4), 1.0);
        assert_eq!(in2mm(2.0), 50.8);
    }
}

/// Round half-up to the nearest integer for display.
///
/// `-0.4` becomes `0`, never `-0`.
pub fn round_display(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Canonical Celsius into the active unit system
pub fn display_temperature(temp_c: f64, units: UnitSystem) -> f64 {
    match units {
        UnitSystem::Metric => temp_c,
        UnitSystem::Imperial => temperature::c2f(temp_c),
    }
}

/// Canonical m/s into km/h or mph
pub fn display_wind_speed(mps: f64, units: UnitSystem) -> f64 {
    match units {
        UnitSystem::Metric => speed::mps2kmh(mps),
        UnitSystem::Imperial => speed::mps2mph(mps),
    }
}

/// Canonical mm into mm or inches
pub fn display_precipitation(mm: f64, units: UnitSystem) -> f64 {
    match units {
        UnitSystem::Metric => mm,
        UnitSystem::Imperial => precipitation::mm2in(mm),
    }
}

pub fn wind_speed_label(units: UnitSystem) -> &'static str {
    match units {
        UnitSystem::Metric => "km/h",
        UnitSystem::Imperial => "mph",
    }
}

pub fn precipitation_label(units: UnitSystem) -> &'static str {
    match units {
        UnitSystem::Metric => "mm",
        UnitSystem::Imperial => "in",
    }
}
