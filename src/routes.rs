use axum::{
    routing::{get, post, put},
    Router,
};

use crate::forecast::handlers as forecast_handlers;
use crate::geocode::handlers as geocode_handlers;
use crate::openapi::swagger_ui;
use crate::panel::handlers as panel_handlers;
use crate::{health, AppState};

/// Build the panel API routes
fn panel_routes() -> Router<AppState> {
    Router::new()
        .route("/panels", post(panel_handlers::create_panel))
        .route(
            "/panels/{id}",
            get(panel_handlers::get_panel).delete(panel_handlers::delete_panel),
        )
        .route("/panels/{id}/search", post(panel_handlers::search))
        .route("/panels/{id}/units", post(panel_handlers::toggle_units))
        .route("/panels/{id}/days/{index}", put(panel_handlers::select_day))
        .route("/panels/{id}/refresh", post(panel_handlers::refresh))
}

/// Build the geocoding and raw forecast routes
fn lookup_routes() -> Router<AppState> {
    Router::new()
        .route("/geocode", get(geocode_handlers::resolve_place))
        .route("/forecast", get(forecast_handlers::get_forecast))
}

/// Build all API v1 routes
pub fn api_v1_routes() -> Router<AppState> {
    Router::new().merge(panel_routes()).merge(lookup_routes())
}

/// Build the complete application router
pub fn build_router() -> Router<AppState> {
    Router::new()
        // Health check at root level
        .route("/", get(health))
        .route("/health", get(health))
        .nest("/api/v1", api_v1_routes())
        // Swagger UI for API documentation
        .merge(swagger_ui())
}
