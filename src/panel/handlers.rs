use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::present::PanelView;
use super::service::PanelError;
use crate::units::UnitSystem;
use crate::AppState;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreatePanelRequest {
    /// Initial unit system; defaults to the configured one
    pub units: Option<UnitSystem>,
    /// IANA time zone used for day boundaries
    pub timezone: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatePanelResponse {
    pub id: Uuid,
    pub view: PanelView,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchRequest {
    pub query: String,
}

/// Create a panel showing the default location
///
/// POST /panels
pub async fn create_panel(
    State(state): State<AppState>,
    Json(request): Json<CreatePanelRequest>,
) -> Result<(StatusCode, Json<CreatePanelResponse>), PanelError> {
    let (id, view) = state
        .panel_service
        .create(request.units, request.timezone)
        .await?;
    Ok((StatusCode::CREATED, Json(CreatePanelResponse { id, view })))
}

/// GET /panels/{id}
pub async fn get_panel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PanelView>, PanelError> {
    Ok(Json(state.panel_service.view(id).await?))
}

/// DELETE /panels/{id}
pub async fn delete_panel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, PanelError> {
    state.panel_service.remove(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Search for a place and load its forecast
///
/// POST /panels/{id}/search
pub async fn search(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<PanelView>, PanelError> {
    Ok(Json(state.panel_service.search(id, &request.query).await?))
}

/// POST /panels/{id}/units
pub async fn toggle_units(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PanelView>, PanelError> {
    Ok(Json(state.panel_service.toggle_units(id).await?))
}

/// PUT /panels/{id}/days/{index}
pub async fn select_day(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<PanelView>, PanelError> {
    Ok(Json(state.panel_service.select_day(id, index).await?))
}

/// POST /panels/{id}/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PanelView>, PanelError> {
    Ok(Json(state.panel_service.refresh(id).await?))
}
