use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// JSON body returned for every failed API call
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
        }
    }

    pub fn with_code(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: Some(code.into()),
        }
    }
}

/// Error body Open-Meteo sends with non-2xx responses
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    reason: String,
}

/// Best available explanation for a failed provider response
pub async fn provider_reason(response: reqwest::Response) -> String {
    let status = response.status();
    response
        .json::<ProviderErrorBody>()
        .await
        .map(|body| body.reason)
        .unwrap_or_else(|_| format!("HTTP {}", status))
}

/// Errors that know how to present themselves over HTTP
pub trait HttpError: std::error::Error {
    fn status_code(&self) -> StatusCode;

    /// Stable code for clients, e.g. "PLACE_NOT_FOUND"
    fn error_code(&self) -> Option<&'static str> {
        None
    }
}

/// Convert any HttpError into an Axum response.
///
/// Client mistakes are logged at warn, everything else at error.
pub fn into_response<E: HttpError>(err: E) -> Response {
    let status = err.status_code();
    let code = err.error_code();
    let message = err.to_string();

    if status.is_client_error() {
        tracing::warn!(error = %message, status = %status, code = ?code, "Request rejected");
    } else {
        tracing::error!(error = %message, status = %status, code = ?code, "API error");
    }

    let body = match code {
        Some(code) => ErrorResponse::with_code(message, code),
        None => ErrorResponse::new(message),
    };

    (status, Json(body)).into_response()
}

/// Implement IntoResponse for an HttpError type
#[macro_export]
macro_rules! impl_into_response {
    ($error_type:ty) => {
        impl axum::response::IntoResponse for $error_type {
            fn into_response(self) -> axum::response::Response {
                $crate::error::into_response(self)
            }
        }
    };
}
