use axum::http::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::backend::WeatherBackend;
use super::present::{render, PanelView};
use super::state::{Applied, DayOutOfRange, Fetched, PanelState, PipelineError, Ticket};
use crate::cache::{start_cache_cleanup_task, TtlCache};
use crate::config::{validate_timezone, AppConfig};
use crate::error::HttpError;
use crate::geocode::Location;
use crate::impl_into_response;
use crate::units::UnitSystem;

#[derive(Error, Debug)]
pub enum PanelError {
    #[error("Panel not found: {0}")]
    PanelNotFound(Uuid),

    #[error("Search text is empty")]
    EmptyQuery,

    #[error(transparent)]
    DayOutOfRange(#[from] DayOutOfRange),

    #[error("Unknown time zone: {0}")]
    InvalidTimezone(String),

    #[error("Panel request aborted: {0}")]
    RequestAborted(String),
}

impl HttpError for PanelError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::PanelNotFound(_) => StatusCode::NOT_FOUND,
            Self::EmptyQuery | Self::DayOutOfRange(_) | Self::InvalidTimezone(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::RequestAborted(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::PanelNotFound(_) => Some("PANEL_NOT_FOUND"),
            Self::EmptyQuery => Some("EMPTY_QUERY"),
            Self::DayOutOfRange(_) => Some("DAY_OUT_OF_RANGE"),
            Self::InvalidTimezone(_) => Some("INVALID_TIMEZONE"),
            Self::RequestAborted(_) => Some("REQUEST_ABORTED"),
        }
    }
}

impl_into_response!(PanelError);

/// Settings every new panel starts from
#[derive(Debug, Clone)]
pub struct PanelDefaults {
    pub location: Location,
    pub units: UnitSystem,
    pub timezone: String,
    pub max_days: usize,
    pub refetch_on_unit_toggle: bool,
    /// Panels not accessed for this long are dropped
    pub idle_ttl: Duration,
}

impl From<&AppConfig> for PanelDefaults {
    fn from(config: &AppConfig) -> Self {
        Self {
            location: config.default_location.clone(),
            units: config.units,
            timezone: config.timezone.clone(),
            max_days: config.display.max_days,
            refetch_on_unit_toggle: config.refetch_on_unit_toggle,
            idle_ttl: Duration::from_secs(config.panels.idle_ttl_secs),
        }
    }
}

type SharedPanel = Arc<Mutex<PanelState>>;

/// Work a ticket stands for
enum Pipeline {
    Search(String),
    Fetch(Location),
}

/// Hosts panel state and drives the search/fetch pipeline for each panel.
///
/// The panel lock is never held across a network call. Each request takes a
/// ticket up front and its outcome is applied only if no newer request was
/// started on the same panel in the meantime. The network half runs on its
/// own task, so a caller that goes away cannot leave a ticket outstanding.
pub struct PanelService {
    backend: Arc<dyn WeatherBackend>,
    panels: Arc<TtlCache<Uuid, SharedPanel>>,
    defaults: PanelDefaults,
}

impl PanelService {
    pub fn new(backend: Arc<dyn WeatherBackend>, defaults: PanelDefaults) -> Self {
        Self {
            backend,
            panels: Arc::new(TtlCache::sliding(defaults.idle_ttl)),
            defaults,
        }
    }

    /// Drop idle panels once per `every`
    pub fn start_idle_sweep(&self, every: Duration) {
        start_cache_cleanup_task(Arc::clone(&self.panels), every, "panels");
    }

    /// Every lookup counts as activity and keeps the panel alive
    fn panel(&self, id: Uuid) -> Result<SharedPanel, PanelError> {
        self.panels.get(&id).ok_or(PanelError::PanelNotFound(id))
    }

    fn render(&self, state: &PanelState) -> PanelView {
        render(state, self.defaults.max_days)
    }

    /// Create a panel at the default location and load its forecast.
    ///
    /// A failed initial load still creates the panel, with the banner set.
    pub async fn create(
        &self,
        units: Option<UnitSystem>,
        timezone: Option<String>,
    ) -> Result<(Uuid, PanelView), PanelError> {
        let timezone = timezone.unwrap_or_else(|| self.defaults.timezone.clone());
        validate_timezone(&timezone).map_err(|_| PanelError::InvalidTimezone(timezone.clone()))?;

        let id = Uuid::new_v4();
        let state = PanelState::new(
            self.defaults.location.clone(),
            units.unwrap_or(self.defaults.units),
            timezone,
        );
        self.panels.insert(id, Arc::new(Mutex::new(state)));
        tracing::info!(panel = %id, "Panel created");

        let view = self.refresh(id).await?;
        Ok((id, view))
    }

    pub async fn view(&self, id: Uuid) -> Result<PanelView, PanelError> {
        let panel = self.panel(id)?;
        let state = panel.lock().await;
        Ok(self.render(&state))
    }

    pub fn remove(&self, id: Uuid) -> Result<(), PanelError> {
        if self.panels.remove(&id).is_none() {
            return Err(PanelError::PanelNotFound(id));
        }
        tracing::info!(panel = %id, "Panel removed");
        Ok(())
    }

    /// Panels held, idle ones included until the next sweep
    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    /// Resolve `query`, then fetch its forecast.
    ///
    /// Resolution and fetch failures end up in the panel's error banner;
    /// only a blank query is rejected outright.
    pub async fn search(&self, id: Uuid, query: &str) -> Result<PanelView, PanelError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PanelError::EmptyQuery);
        }

        let panel = self.panel(id)?;
        let (ticket, units, timezone) = {
            let mut state = panel.lock().await;
            let ticket = state.begin_search(query);
            (ticket, state.units(), state.timezone().to_string())
        };

        tracing::debug!(panel = %id, query = %query, "Searching");

        self.run(id, panel, ticket, Pipeline::Search(query.to_string()), units, timezone)
            .await
    }

    /// Re-fetch the panel's current location
    pub async fn refresh(&self, id: Uuid) -> Result<PanelView, PanelError> {
        let panel = self.panel(id)?;
        let (ticket, location, units, timezone) = {
            let mut state = panel.lock().await;
            let ticket = state.begin_request();
            (
                ticket,
                state.location().clone(),
                state.units(),
                state.timezone().to_string(),
            )
        };

        self.run(id, panel, ticket, Pipeline::Fetch(location), units, timezone)
            .await
    }

    /// Flip between metric and imperial display.
    ///
    /// Stored values are canonical, so this is a local recompute unless the
    /// legacy re-fetch policy is configured.
    pub async fn toggle_units(&self, id: Uuid) -> Result<PanelView, PanelError> {
        let panel = self.panel(id)?;
        let units = {
            let mut state = panel.lock().await;
            let units = state.toggle_units();
            if !self.defaults.refetch_on_unit_toggle {
                tracing::debug!(panel = %id, units = %units, "Units toggled");
                return Ok(self.render(&state));
            }
            units
        };

        tracing::debug!(panel = %id, units = %units, "Units toggled, re-fetching");
        self.refresh(id).await
    }

    pub async fn select_day(&self, id: Uuid, index: usize) -> Result<PanelView, PanelError> {
        let panel = self.panel(id)?;
        let mut state = panel.lock().await;
        state.select_day(index)?;
        Ok(self.render(&state))
    }

    /// Perform `pipeline` for `ticket` on a detached task and wait for it.
    ///
    /// Dropping the returned future does not cancel the task; the outcome is
    /// still applied and the panel leaves its loading state.
    async fn run(
        &self,
        id: Uuid,
        panel: SharedPanel,
        ticket: Ticket,
        pipeline: Pipeline,
        units: UnitSystem,
        timezone: String,
    ) -> Result<PanelView, PanelError> {
        let backend = Arc::clone(&self.backend);
        let max_days = self.defaults.max_days;

        let task = tokio::spawn(async move {
            let outcome = match pipeline {
                Pipeline::Search(query) => {
                    resolve_and_fetch(backend.as_ref(), &query, units, &timezone).await
                }
                Pipeline::Fetch(location) => {
                    fetch(backend.as_ref(), location, units, &timezone).await
                }
            };

            let mut state = panel.lock().await;
            finish(id, &mut state, ticket, outcome);
            render(&state, max_days)
        });

        task.await.map_err(|e| {
            tracing::error!(panel = %id, error = %e, "Panel request task failed");
            PanelError::RequestAborted(e.to_string())
        })
    }
}

async fn resolve_and_fetch(
    backend: &dyn WeatherBackend,
    query: &str,
    units: UnitSystem,
    timezone: &str,
) -> Result<Fetched, PipelineError> {
    let location = backend.resolve(query).await?;
    fetch(backend, location, units, timezone).await
}

async fn fetch(
    backend: &dyn WeatherBackend,
    location: Location,
    units: UnitSystem,
    timezone: &str,
) -> Result<Fetched, PipelineError> {
    let forecast = backend.forecast(&location, units, timezone).await?;
    Ok(Fetched { location, forecast })
}

fn finish(
    id: Uuid,
    state: &mut PanelState,
    ticket: Ticket,
    outcome: Result<Fetched, PipelineError>,
) {
    if let Err(err) = &outcome {
        tracing::warn!(panel = %id, error = %err, "Panel request failed");
    }

    match state.complete(ticket, outcome) {
        Applied::Updated => {
            tracing::info!(panel = %id, location = %state.location().name, "Panel updated");
        }
        Applied::Failed => {}
        Applied::Stale => {
            tracing::debug!(panel = %id, "Discarded response superseded by a newer request");
        }
    }
}
