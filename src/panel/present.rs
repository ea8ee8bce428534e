//! Everything a panel displays, derived from its state.
//!
//! Nothing here mutates or fetches; the same state and units always produce
//! the same strings. Values are rounded only at this point.

use serde::Serialize;
use utoipa::ToSchema;

use super::state::{ErrorBanner, PanelState};
use crate::conditions::Condition;
use crate::forecast::{DailyRecord, HourlyRecord, NormalizedForecast};
use crate::geocode::Location;
use crate::units::{self, round_display, UnitSystem};

pub const PLACEHOLDER: &str = "-";
pub const NO_HOURLY_DATA: &str = "No hourly data";
pub const NO_DAILY_DATA: &str = "No forecast yet";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PanelView {
    pub location: Location,
    pub units: UnitSystem,
    /// Search text of the request in flight, empty otherwise
    pub query: String,
    pub loading: bool,
    pub error: Option<ErrorBanner>,
    pub current: CurrentView,
    pub daily: DailyPanel,
    pub selected_day_index: usize,
    pub hourly: HourlyPanel,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CurrentView {
    pub temperature: String,
    /// No apparent temperature is modelled; always equals `temperature`
    pub feels_like: String,
    pub humidity: String,
    pub wind: String,
    pub precipitation: String,
    pub condition: Condition,
    pub icon: String,
    pub observed_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyPanel {
    pub days: Vec<DayView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DayView {
    pub index: usize,
    pub date: String,
    pub weekday: String,
    pub condition: Condition,
    pub icon: String,
    pub max: String,
    pub min: String,
    pub precipitation: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HourlyPanel {
    /// Long label of the selected day, e.g. "Tue, Aug 5"
    pub day_label: Option<String>,
    /// Every available day, for the day picker
    pub day_options: Vec<String>,
    pub hours: Vec<HourView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HourView {
    pub time: String,
    pub condition: Condition,
    pub icon: String,
    pub temperature: String,
}

/// Derive the full view of a panel, showing at most `max_days` days
pub fn render(state: &PanelState, max_days: usize) -> PanelView {
    let units = state.units();
    let forecast = state.forecast();

    PanelView {
        location: state.location().clone(),
        units,
        query: state.query().to_string(),
        loading: state.loading(),
        error: state.error().cloned(),
        current: current_view(forecast, units),
        daily: daily_panel(forecast, state.selected_day(), units, max_days),
        selected_day_index: state.selected_day(),
        hourly: hourly_panel(forecast, state.selected_day(), units),
    }
}

fn current_view(forecast: Option<&NormalizedForecast>, units: UnitSystem) -> CurrentView {
    let current = forecast.and_then(|f| f.current.as_ref());
    let first_hour = forecast.and_then(|f| f.hourly.first());

    let temperature_c = current
        .and_then(|c| c.temperature_c)
        .or_else(|| first_hour.and_then(|h| h.temperature_c));
    let wind_mps = current
        .and_then(|c| c.wind_speed_mps)
        .or_else(|| first_hour.and_then(|h| h.wind_speed_mps));
    let code = current
        .and_then(|c| c.weather_code)
        .or_else(|| first_hour.and_then(|h| h.weather_code));
    let condition = Condition::from_optional(code);

    let temperature = format_temperature(temperature_c, units);

    CurrentView {
        feels_like: temperature.clone(),
        temperature,
        humidity: format_humidity(first_hour.and_then(|h| h.humidity_pct)),
        wind: format_wind(wind_mps, units),
        precipitation: format_precipitation(first_hour.and_then(|h| h.precipitation_mm), units),
        condition,
        icon: condition.icon().to_string(),
        observed_at: current
            .and_then(|c| c.observed_at)
            .map(|t| t.format("%A, %b %-d, %Y %H:%M").to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
    }
}

fn daily_panel(
    forecast: Option<&NormalizedForecast>,
    selected: usize,
    units: UnitSystem,
    max_days: usize,
) -> DailyPanel {
    let days: Vec<DayView> = forecast
        .map(|f| f.daily.as_slice())
        .unwrap_or_default()
        .iter()
        .take(max_days)
        .enumerate()
        .map(|(index, day)| day_view(index, day, index == selected, units))
        .collect();

    let placeholder = days.is_empty().then(|| NO_DAILY_DATA.to_string());
    DailyPanel { days, placeholder }
}

fn day_view(index: usize, day: &DailyRecord, selected: bool, units: UnitSystem) -> DayView {
    let condition = Condition::from_optional(day.weather_code);
    DayView {
        index,
        date: day.date.to_string(),
        weekday: day.date.format("%a").to_string(),
        condition,
        icon: condition.icon().to_string(),
        max: format_temperature(day.max_c, units),
        min: format_temperature(day.min_c, units),
        precipitation: format_precipitation(day.precipitation_sum_mm, units),
        selected,
    }
}

fn hourly_panel(
    forecast: Option<&NormalizedForecast>,
    selected: usize,
    units: UnitSystem,
) -> HourlyPanel {
    let day = forecast.and_then(|f| f.daily.get(selected));

    let hours: Vec<HourView> = match (forecast, day) {
        (Some(f), Some(day)) => f.hours_on(day.date).map(|h| hour_view(h, units)).collect(),
        _ => Vec::new(),
    };

    HourlyPanel {
        day_label: day.map(|d| d.date.format("%a, %b %-d").to_string()),
        day_options: forecast
            .map(|f| {
                f.daily
                    .iter()
                    .map(|d| d.date.format("%a, %b %-d").to_string())
                    .collect()
            })
            .unwrap_or_default(),
        placeholder: hours.is_empty().then(|| NO_HOURLY_DATA.to_string()),
        hours,
    }
}

fn hour_view(hour: &HourlyRecord, units: UnitSystem) -> HourView {
    let condition = Condition::from_optional(hour.weather_code);
    HourView {
        time: hour.time.format("%-I %p").to_string(),
        condition,
        icon: condition.icon().to_string(),
        temperature: format_temperature(hour.temperature_c, units),
    }
}

pub fn format_temperature(celsius: Option<f64>, units: UnitSystem) -> String {
    match celsius {
        Some(c) => format!("{}°", round_display(units::display_temperature(c, units))),
        None => PLACEHOLDER.to_string(),
    }
}

pub fn format_wind(mps: Option<f64>, units: UnitSystem) -> String {
    match mps {
        Some(v) => format!(
            "{} {}",
            round_display(units::display_wind_speed(v, units)),
            units::wind_speed_label(units)
        ),
        None => PLACEHOLDER.to_string(),
    }
}

pub fn format_precipitation(mm: Option<f64>, units: UnitSystem) -> String {
    match mm {
        Some(v) => format!(
            "{} {}",
            round_display(units::display_precipitation(v, units)),
            units::precipitation_label(units)
        ),
        None => PLACEHOLDER.to_string(),
    }
}

pub fn format_humidity(pct: Option<f64>) -> String {
    match pct {
        Some(v) => format!("{}%", round_display(v)),
        None => PLACEHOLDER.to_string(),
    }
}
