use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::forecast::{ForecastError, NormalizedForecast};
use crate::geocode::{GeocodeError, Location};
use crate::units::UnitSystem;

/// Failure of a search or fetch, before it becomes a banner
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

/// What the user is told went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    ProviderError,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ErrorBanner {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&PipelineError> for ErrorBanner {
    fn from(err: &PipelineError) -> Self {
        let kind = match err {
            PipelineError::Geocode(e) if !e.is_provider_error() => ErrorKind::NotFound,
            _ => ErrorKind::ProviderError,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// Issued when a request starts; only the newest ticket may apply its result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Location and records produced together by one successful fetch
#[derive(Debug, Clone)]
pub struct Fetched {
    pub location: Location,
    pub forecast: NormalizedForecast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    Failed,
    /// A newer request was issued after this one; result discarded
    Stale,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Day {index} is out of range ({len} days available)")]
pub struct DayOutOfRange {
    pub index: usize,
    pub len: usize,
}

/// Everything one weather panel holds. Mutated only through the
/// transition methods below.
#[derive(Debug, Clone)]
pub struct PanelState {
    query: String,
    location: Location,
    units: UnitSystem,
    timezone: String,
    forecast: Option<NormalizedForecast>,
    selected_day: usize,
    loading: bool,
    error: Option<ErrorBanner>,
    latest_ticket: u64,
}

impl PanelState {
    pub fn new(location: Location, units: UnitSystem, timezone: impl Into<String>) -> Self {
        Self {
            query: String::new(),
            location,
            units,
            timezone: timezone.into(),
            forecast: None,
            selected_day: 0,
            loading: false,
            error: None,
            latest_ticket: 0,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    pub fn forecast(&self) -> Option<&NormalizedForecast> {
        self.forecast.as_ref()
    }

    pub fn selected_day(&self) -> usize {
        self.selected_day
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&ErrorBanner> {
        self.error.as_ref()
    }

    fn day_count(&self) -> usize {
        self.forecast.as_ref().map_or(0, |f| f.daily.len())
    }

    /// Start a search for `query`
    pub fn begin_search(&mut self, query: &str) -> Ticket {
        self.query = query.to_string();
        self.begin_request()
    }

    /// Start any request; supersedes every ticket issued before
    pub fn begin_request(&mut self) -> Ticket {
        self.latest_ticket += 1;
        self.loading = true;
        self.error = None;
        Ticket(self.latest_ticket)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest_ticket
    }

    /// Apply the outcome of the request holding `ticket`.
    ///
    /// Success replaces location and records together and resets the
    /// selected day; failure keeps the previous data and sets the banner.
    pub fn complete(&mut self, ticket: Ticket, outcome: Result<Fetched, PipelineError>) -> Applied {
        if !self.is_current(ticket) {
            return Applied::Stale;
        }

        self.loading = false;
        self.query.clear();

        match outcome {
            Ok(fetched) => {
                self.location = fetched.location;
                self.forecast = Some(fetched.forecast);
                self.selected_day = 0;
                self.error = None;
                Applied::Updated
            }
            Err(err) => {
                self.error = Some(ErrorBanner::from(&err));
                Applied::Failed
            }
        }
    }

    pub fn select_day(&mut self, index: usize) -> Result<(), DayOutOfRange> {
        let len = self.day_count();
        if index >= len {
            return Err(DayOutOfRange { index, len });
        }
        self.selected_day = index;
        Ok(())
    }

    /// Flip the display units; nothing stored changes
    pub fn toggle_units(&mut self) -> UnitSystem {
        self.units = self.units.toggled();
        self.units
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::DailyRecord;
    use chrono::NaiveDate;

    fn berlin() -> Location {
        Location {
            name: "Berlin, Germany".to_string(),
            latitude: 52.52,
            longitude: 13.405,
        }
    }

    fn london() -> Location {
        Location {
            name: "London, England, United Kingdom".to_string(),
            latitude: 51.50853,
            longitude: -0.12574,
        }
    }

    fn forecast_with_days(days: u32) -> NormalizedForecast {
        let start = NaiveDate::from_ymd_opt(2025, 8, 5).unwrap();
        NormalizedForecast {
            daily: (0..days)
                .map(|i| DailyRecord {
                    date: start + chrono::Days::new(i as u64),
                    max_c: Some(20.0),
                    min_c: Some(10.0),
                    precipitation_sum_mm: Some(0.0),
                    weather_code: Some(0),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn fetched(location: Location, days: u32) -> Result<Fetched, PipelineError> {
        Ok(Fetched {
            location,
            forecast: forecast_with_days(days),
        })
    }

    fn not_found(query: &str) -> Result<Fetched, PipelineError> {
        Err(GeocodeError::NotFound(query.to_string()).into())
    }

    #[test]
    fn test_success_replaces_everything_and_resets_day() {
        let mut state = PanelState::new(berlin(), UnitSystem::Metric, "UTC");
        let t = state.begin_request();
        state.complete(t, fetched(berlin(), 7));
        state.select_day(5).unwrap();

        let t = state.begin_search("London");
        assert!(state.loading());
        assert_eq!(state.query(), "London");
        assert_eq!(state.complete(t, fetched(london(), 3)), Applied::Updated);

        assert_eq!(state.location(), &london());
        assert_eq!(state.selected_day(), 0);
        assert_eq!(state.forecast().unwrap().daily.len(), 3);
        assert!(!state.loading());
        assert!(state.query().is_empty());
    }

    #[test]
    fn test_failure_keeps_previous_data() {
        let mut state = PanelState::new(berlin(), UnitSystem::Metric, "UTC");
        let t = state.begin_request();
        state.complete(t, fetched(berlin(), 7));
        state.select_day(2).unwrap();

        let t = state.begin_search("zzzznotaplace");
        assert_eq!(state.complete(t, not_found("zzzznotaplace")), Applied::Failed);

        assert_eq!(state.location(), &berlin());
        assert_eq!(state.forecast().unwrap().daily.len(), 7);
        assert_eq!(state.selected_day(), 2);
        let banner = state.error().unwrap();
        assert_eq!(banner.kind, ErrorKind::NotFound);
        assert!(banner.message.contains("zzzznotaplace"));
    }

    #[test]
    fn test_new_request_clears_banner() {
        let mut state = PanelState::new(berlin(), UnitSystem::Metric, "UTC");
        let t = state.begin_request();
        state.complete(t, Err(ForecastError::ApiError("HTTP 502".to_string()).into()));
        assert_eq!(state.error().unwrap().kind, ErrorKind::ProviderError);

        state.begin_request();
        assert!(state.error().is_none());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut state = PanelState::new(berlin(), UnitSystem::Metric, "UTC");
        let slow = state.begin_search("Paris");
        let fast = state.begin_search("London");

        assert_eq!(state.complete(fast, fetched(london(), 7)), Applied::Updated);
        state.select_day(4).unwrap();
        assert_eq!(state.complete(slow, fetched(berlin(), 2)), Applied::Stale);

        assert_eq!(state.location(), &london());
        assert_eq!(state.selected_day(), 4);
        assert_eq!(state.forecast().unwrap().daily.len(), 7);
    }

    #[test]
    fn test_stale_failure_does_not_clear_loading() {
        let mut state = PanelState::new(berlin(), UnitSystem::Metric, "UTC");
        let old = state.begin_request();
        let _newer = state.begin_request();

        assert_eq!(state.complete(old, not_found("x")), Applied::Stale);
        assert!(state.loading());
        assert!(state.error().is_none());
    }

    #[test]
    fn test_select_day_bounds() {
        let mut state = PanelState::new(berlin(), UnitSystem::Metric, "UTC");
        assert_eq!(state.select_day(0), Err(DayOutOfRange { index: 0, len: 0 }));

        let t = state.begin_request();
        state.complete(t, fetched(berlin(), 7));
        assert!(state.select_day(6).is_ok());
        assert_eq!(state.select_day(7), Err(DayOutOfRange { index: 7, len: 7 }));
        assert_eq!(state.selected_day(), 6);
    }

    #[test]
    fn test_selected_day_in_bounds_after_every_fetch() {
        let mut state = PanelState::new(berlin(), UnitSystem::Metric, "UTC");
        for days in [7, 1, 16, 3] {
            let t = state.begin_request();
            state.complete(t, fetched(berlin(), days));
            assert!(state.selected_day() < state.forecast().unwrap().daily.len());
            state.select_day(days as usize - 1).unwrap();
        }
    }

    #[test]
    fn test_toggle_units_touches_nothing_else() {
        let mut state = PanelState::new(berlin(), UnitSystem::Metric, "UTC");
        let t = state.begin_request();
        state.complete(t, fetched(berlin(), 7));
        state.select_day(3).unwrap();
        let before = state.forecast().cloned();

        assert_eq!(state.toggle_units(), UnitSystem::Imperial);
        assert_eq!(state.selected_day(), 3);
        assert_eq!(state.location(), &berlin());
        assert_eq!(state.forecast().cloned(), before);
        assert_eq!(state.toggle_units(), UnitSystem::Metric);
    }
}
