mod cache;
mod conditions;
mod config;
mod error;
mod forecast;
mod geocode;
mod openapi;
mod panel;
mod routes;
mod units;

use axum::{
    error_handling::HandleErrorLayer, extract::State, http::StatusCode, BoxError, Json,
};
use reqwest::Client;
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cache::{create_geo_cache, start_cache_cleanup_task};
use crate::config::AppConfig;
use crate::forecast::ForecastService;
use crate::geocode::GeocodeService;
use crate::panel::{OpenMeteoBackend, PanelDefaults, PanelService};

/// Shared HTTP client configuration
const HTTP_TIMEOUT_SECS: u64 = 30;
const HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;
const HTTP_POOL_IDLE_TIMEOUT_SECS: u64 = 90;

/// How often expired geocoding entries are swept
const CACHE_CLEANUP_INTERVAL_SECS: u64 = 600;

#[derive(Clone)]
pub struct AppState {
    pub geocode_service: Arc<GeocodeService>,
    pub forecast_service: Arc<ForecastService>,
    pub panel_service: Arc<PanelService>,
    pub config: Arc<AppConfig>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub panels: usize,
}

/// Health check
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        panels: state.panel_service.panel_count(),
    })
}

/// Create shared HTTP client with connection pooling
fn create_http_client() -> reqwest::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
        .pool_idle_timeout(Duration::from_secs(HTTP_POOL_IDLE_TIMEOUT_SECS))
        .pool_max_idle_per_host(10)
        .build()
}

/// Handle request timeout errors
async fn handle_timeout_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "Request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Internal error: {}", err),
        )
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skypanel=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;
    tracing::info!(
        timezone = %config.timezone,
        units = %config.units,
        default_location = %config.default_location.name,
        "Configuration loaded successfully"
    );

    let http_client = create_http_client()?;
    tracing::debug!("Shared HTTP client created");

    let geo_cache = create_geo_cache(Duration::from_secs(config.geocoding.cache_ttl_secs));
    start_cache_cleanup_task(
        Arc::clone(&geo_cache),
        Duration::from_secs(CACHE_CLEANUP_INTERVAL_SECS),
        "geocoding",
    );

    let geocode_service = Arc::new(GeocodeService::new(
        http_client.clone(),
        &config.geocoding_url,
        config.geocoding.result_count,
        &config.geocoding.language,
        geo_cache,
    ));
    let forecast_service = Arc::new(ForecastService::new(
        http_client.clone(),
        &config.forecast_url,
    ));

    let backend = Arc::new(OpenMeteoBackend::new(
        Arc::clone(&geocode_service),
        Arc::clone(&forecast_service),
    ));
    let panel_service = Arc::new(PanelService::new(backend, PanelDefaults::from(&config)));
    panel_service.start_idle_sweep(Duration::from_secs(config.panels.sweep_interval_secs));
    tracing::info!(
        idle_ttl_secs = config.panels.idle_ttl_secs,
        "Idle panel sweep started"
    );
    if config.refetch_on_unit_toggle {
        tracing::info!("Unit toggles will re-fetch from the provider");
    }

    let state = AppState {
        geocode_service,
        forecast_service,
        panel_service,
        config: Arc::new(config.clone()),
    };

    let app = routes::build_router()
        .layer(
            ServiceBuilder::new()
                // Handle timeout errors
                .layer(HandleErrorLayer::new(handle_timeout_error))
                // Two upstream calls per search, each bounded by the client timeout
                .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS * 2)),
        )
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
