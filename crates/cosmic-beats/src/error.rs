use crate::config::ConfigError;
use crate::profiles::{CompletionServiceError, SchemaError, StoreError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("invalid profile document: {0}")]
    ProfileDocument(#[from] serde_json::Error),
    #[error("completion error: {0}")]
    Completion(#[from] CompletionServiceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::ProfileDocument(_) => StatusCode::BAD_REQUEST,
            AppError::Completion(CompletionServiceError::Store(StoreError::NotFound)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Completion(CompletionServiceError::Store(StoreError::Conflict)) => {
                StatusCode::CONFLICT
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Schema(_)
            | AppError::Completion(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
