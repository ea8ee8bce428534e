use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::conditions::Condition;
use crate::error::ErrorResponse;
use crate::forecast::{CurrentConditions, DailyRecord, HourlyRecord, NormalizedForecast};
use crate::geocode::Location;
use crate::panel::handlers::{CreatePanelRequest, CreatePanelResponse, SearchRequest};
use crate::panel::present::{CurrentView, DailyPanel, DayView, HourView, HourlyPanel, PanelView};
use crate::panel::state::{ErrorBanner, ErrorKind};
use crate::units::UnitSystem;

/// OpenAPI documentation for the Skypanel API
///
/// Schema documentation only; handlers carry no path annotations.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Skypanel API",
        version = "1.0.0",
        description = "Weather panels backed by Open-Meteo. Search a place, then read current conditions, a daily outlook and an hourly breakdown in metric or imperial units.",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    tags(
        (name = "panels", description = "Weather panel sessions"),
        (name = "geocode", description = "Place name resolution"),
        (name = "forecast", description = "Normalized forecast records")
    ),
    components(
        schemas(
            ErrorResponse,
            UnitSystem,
            Condition,
            Location,
            CurrentConditions,
            HourlyRecord,
            DailyRecord,
            NormalizedForecast,
            ErrorKind,
            ErrorBanner,
            CreatePanelRequest,
            CreatePanelResponse,
            SearchRequest,
            PanelView,
            CurrentView,
            DailyPanel,
            DayView,
            HourlyPanel,
            HourView,
        )
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_panel_schemas() {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.expect("components").schemas;
        for name in ["PanelView", "ErrorBanner", "NormalizedForecast", "Location"] {
            assert!(schemas.contains_key(name), "missing schema {name}");
        }
    }
}
