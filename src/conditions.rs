use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Display category for a WMO weather code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Clear,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
    /// Fallback for codes outside every known range
    #[default]
    Hazy,
}

impl Condition {
    /// Map a WMO weather code onto a display category.
    /// See: https://open-meteo.com/en/docs#weathervariables
    ///
    /// Total over `i32`; shower codes (80-82) and anything unknown fall
    /// through to `Hazy`.
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 | 1 => Self::Clear,
            2 => Self::PartlyCloudy,
            3 => Self::Overcast,
            45 | 48 => Self::Fog,
            51 | 53 | 55 | 56 | 57 => Self::Drizzle,
            61 | 63 | 65 | 66 | 67 => Self::Rain,
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Hazy,
        }
    }

    /// Missing codes render with the fallback category
    pub fn from_optional(code: Option<i32>) -> Self {
        code.map(Self::from_wmo_code).unwrap_or_default()
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Overcast => "Overcast",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Thunderstorm => "Thunderstorm",
            Self::Hazy => "Partly Sunny",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Clear => "\u{2600}\u{FE0F}",
            Self::PartlyCloudy => "\u{26C5}",
            Self::Overcast => "\u{2601}\u{FE0F}",
            Self::Fog => "\u{1F32B}\u{FE0F}",
            Self::Drizzle | Self::Rain => "\u{1F327}\u{FE0F}",
            Self::Snow => "\u{2744}\u{FE0F}",
            Self::Thunderstorm => "\u{26C8}\u{FE0F}",
            Self::Hazy => "\u{1F324}\u{FE0F}",
        }
    }
}
