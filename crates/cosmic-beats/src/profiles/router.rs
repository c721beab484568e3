use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde_json::json;

use super::completion::completion_reward;
use super::domain::{Profile, ProfileId, Role};
use super::repository::{ProfileStore, RewardPublisher, StoreError};
use super::service::{CompletionServiceError, ProfileCompletionService};

/// Router builder exposing profile scoring endpoints.
pub fn profile_router<S, P>(service: Arc<ProfileCompletionService<S, P>>) -> Router
where
    S: ProfileStore + 'static,
    P: RewardPublisher + 'static,
{
    Router::new()
        .route("/api/v1/profiles", post(register_handler::<S, P>))
        .route("/api/v1/profiles/:profile_id", put(save_handler::<S, P>))
        .route(
            "/api/v1/profiles/:profile_id/completion",
            get(completion_handler::<S, P>),
        )
        .route("/api/v1/schemas/:role", get(schema_handler::<S, P>))
        .route("/api/v1/rewards/:percentage", get(reward_handler))
        .with_state(service)
}

pub(crate) async fn register_handler<S, P>(
    State(service): State<Arc<ProfileCompletionService<S, P>>>,
    axum::Json(profile): axum::Json<Profile>,
) -> Response
where
    S: ProfileStore + 'static,
    P: RewardPublisher + 'static,
{
    match service.register(profile) {
        Ok(evaluation) => (StatusCode::CREATED, axum::Json(evaluation)).into_response(),
        Err(CompletionServiceError::Store(StoreError::Conflict)) => {
            let payload = json!({
                "error": "profile already exists",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => service_error_response(other),
    }
}

pub(crate) async fn save_handler<S, P>(
    State(service): State<Arc<ProfileCompletionService<S, P>>>,
    Path(profile_id): Path<String>,
    axum::Json(profile): axum::Json<Profile>,
) -> Response
where
    S: ProfileStore + 'static,
    P: RewardPublisher + 'static,
{
    if profile.id.0 != profile_id {
        let payload = json!({
            "error": format!(
                "profile id '{}' does not match path '{}'",
                profile.id, profile_id
            ),
        });
        return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
    }

    match service.save(profile) {
        Ok(evaluation) => (StatusCode::OK, axum::Json(evaluation)).into_response(),
        Err(other) => service_error_response(other),
    }
}

pub(crate) async fn completion_handler<S, P>(
    State(service): State<Arc<ProfileCompletionService<S, P>>>,
    Path(profile_id): Path<String>,
) -> Response
where
    S: ProfileStore + 'static,
    P: RewardPublisher + 'static,
{
    match service.completion(&ProfileId(profile_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(other) => service_error_response(other),
    }
}

pub(crate) async fn schema_handler<S, P>(
    State(service): State<Arc<ProfileCompletionService<S, P>>>,
    Path(role): Path<String>,
) -> Response
where
    S: ProfileStore + 'static,
    P: RewardPublisher + 'static,
{
    let role = match role.parse::<Role>() {
        Ok(role) => role,
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::NOT_FOUND, axum::Json(payload)).into_response();
        }
    };

    let payload = json!({
        "role": role,
        "requiredFields": service.engine().registry().required_fields(role),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn reward_handler(Path(percentage): Path<u16>) -> Response {
    match u8::try_from(percentage) {
        Ok(percentage) if percentage <= 100 => {
            (StatusCode::OK, axum::Json(completion_reward(percentage))).into_response()
        }
        _ => {
            let payload = json!({
                "error": "percentage must be between 0 and 100",
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
    }
}

fn service_error_response(error: CompletionServiceError) -> Response {
    let status = match &error {
        CompletionServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        CompletionServiceError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        CompletionServiceError::Store(StoreError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
