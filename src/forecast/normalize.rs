use chrono::{NaiveDate, NaiveDateTime};

use super::models::*;
use crate::units::{precipitation, speed, temperature, UnitSystem};

/// Convert a provider payload into the canonical store.
///
/// Total: whatever was requested from the provider, temperatures come back
/// as Celsius and wind speeds as m/s. Precipitation is requested in
/// millimetres but follows the unit label the payload reports, so an
/// `"inch"` series is converted too. Unusable values become `None`; hourly entries without a
/// readable time and daily entries without a readable, strictly increasing
/// date are left out.
pub fn normalize(payload: &RawForecastPayload, requested: UnitSystem) -> NormalizedForecast {
    let current = payload
        .current_weather
        .as_ref()
        .map(|cw| normalize_current(cw, requested));

    let hourly = payload
        .hourly
        .as_ref()
        .map(|h| {
            let unit = payload
                .hourly_units
                .as_ref()
                .and_then(|u| u.precipitation.as_deref());
            normalize_hourly(h, requested, unit)
        })
        .unwrap_or_default();

    let daily = payload
        .daily
        .as_ref()
        .map(|d| {
            let unit = payload
                .daily_units
                .as_ref()
                .and_then(|u| u.precipitation_sum.as_deref());
            normalize_daily(d, requested, unit)
        })
        .unwrap_or_default();

    NormalizedForecast {
        timezone: payload.timezone.clone(),
        current,
        hourly,
        daily,
    }
}

fn normalize_current(raw: &RawCurrentWeather, requested: UnitSystem) -> CurrentConditions {
    CurrentConditions {
        temperature_c: raw.temperature.and_then(|t| to_celsius(t, requested)),
        wind_speed_mps: raw.windspeed.and_then(|w| to_mps(w, requested)),
        weather_code: raw.weathercode.and_then(to_code),
        observed_at: raw.time.as_deref().and_then(parse_time),
    }
}

fn normalize_hourly(
    raw: &RawHourly,
    requested: UnitSystem,
    precipitation_unit: Option<&str>,
) -> Vec<HourlyRecord> {
    let mut dropped = 0usize;
    let records: Vec<HourlyRecord> = raw
        .time
        .iter()
        .enumerate()
        .filter_map(|(i, time)| {
            let Some(time) = time.as_deref().and_then(parse_time) else {
                dropped += 1;
                return None;
            };
            Some(HourlyRecord {
                time,
                temperature_c: at(&raw.temperature_2m, i).and_then(|t| to_celsius(t, requested)),
                humidity_pct: at(&raw.relativehumidity_2m, i).filter(|h| h.is_finite()),
                precipitation_mm: at(&raw.precipitation, i)
                    .and_then(|p| to_mm(p, precipitation_unit)),
                weather_code: at(&raw.weathercode, i).and_then(to_code),
                wind_speed_mps: at(&raw.windspeed_10m, i).and_then(|w| to_mps(w, requested)),
            })
        })
        .collect();

    if dropped > 0 {
        tracing::debug!(dropped, kept = records.len(), "Skipped hourly entries without a time");
    }
    records
}

fn normalize_daily(
    raw: &RawDaily,
    requested: UnitSystem,
    precipitation_unit: Option<&str>,
) -> Vec<DailyRecord> {
    let mut records: Vec<DailyRecord> = Vec::with_capacity(raw.time.len());

    for (i, date) in raw.time.iter().enumerate() {
        let Some(date) = date.as_deref().and_then(parse_date) else {
            continue;
        };
        if records.last().is_some_and(|prev| prev.date >= date) {
            continue;
        }
        records.push(DailyRecord {
            date,
            max_c: at(&raw.temperature_2m_max, i).and_then(|t| to_celsius(t, requested)),
            min_c: at(&raw.temperature_2m_min, i).and_then(|t| to_celsius(t, requested)),
            precipitation_sum_mm: at(&raw.precipitation_sum, i)
                .and_then(|p| to_mm(p, precipitation_unit)),
            weather_code: at(&raw.weathercode, i).and_then(to_code),
        });
    }

    if records.len() < raw.time.len() {
        tracing::debug!(
            dropped = raw.time.len() - records.len(),
            kept = records.len(),
            "Skipped daily entries with unusable dates"
        );
    }
    records
}

/// Element `i` of a parallel array; short arrays read as unknown
fn at(series: &[Option<f64>], i: usize) -> Option<f64> {
    series.get(i).copied().flatten()
}

fn to_celsius(value: f64, requested: UnitSystem) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    Some(match requested {
        UnitSystem::Metric => value,
        UnitSystem::Imperial => temperature::f2c(value),
    })
}

fn to_mps(value: f64, requested: UnitSystem) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    Some(match requested {
        UnitSystem::Metric => speed::kmh2mps(value),
        UnitSystem::Imperial => speed::mph2mps(value),
    })
}

/// Anything but an explicit `"inch"` label is taken as millimetres
fn to_mm(value: f64, unit: Option<&str>) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    Some(match unit {
        Some("inch") => precipitation::in2mm(value),
        _ => value,
    })
}

fn to_code(value: f64) -> Option<i32> {
    value.is_finite().then(|| value.round() as i32)
}

/// Open-Meteo local times: "2025-08-05T13:00", seconds optional
fn parse_time(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
