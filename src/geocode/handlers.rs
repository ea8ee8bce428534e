use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use super::models::Location;
use super::service::GeocodeError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    /// Free-text place name
    #[serde(default)]
    pub name: String,
}

/// Resolve a place name to coordinates
///
/// GET /geocode?name=Berlin
pub async fn resolve_place(
    State(state): State<AppState>,
    Query(query): Query<GeocodeQuery>,
) -> Result<Json<Location>, GeocodeError> {
    let location = state.geocode_service.resolve(&query.name).await?;
    Ok(Json(location))
}
