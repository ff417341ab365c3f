use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cardiorisk_common::CardioRiskError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Errors returned by HTTP handlers, rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("User not authenticated")]
    Unauthenticated,

    #[error("ISS link is {iss}, but the app's registered link is {expected}")]
    IssuerMismatch { iss: String, expected: String },

    #[error("Invalid state parameter.")]
    InvalidState,

    #[error("No launch in progress")]
    NoLaunch,

    #[error("An error occurred when obtaining an access token: {0}")]
    TokenExchange(#[source] CardioRiskError),

    #[error("An error occurred when obtaining data for rendering: {0}")]
    RecordFetch(#[source] CardioRiskError),

    #[error("Template rendering failed: {0}")]
    Template(#[from] minijinja::Error),

    #[error(transparent)]
    Core(#[from] CardioRiskError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        let code = match self {
            AppError::Unauthenticated => 401,
            AppError::IssuerMismatch { .. } | AppError::InvalidState | AppError::NoLaunch => 400,
            AppError::TokenExchange(e) | AppError::RecordFetch(e) | AppError::Core(e) => e.status_code(),
            AppError::Template(_) => 500,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
