//! Administrative account-state toggles.
//!
//! Both toggles are involutions: applying one twice restores the original
//! value. They are last-write-wins with no cross-user ordering, and neither
//! ever touches the `activated` flag.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use super::error::{AuthError, ErrorBody};
use super::storage;
use super::types::{ToggleBlockedResponse, ToggleVerifiedResponse};

/// Flip the blocked flag of an account.
#[utoipa::path(
    post,
    path = "/v1/admin/users/{id}/block",
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "Blocked flag flipped", body = ToggleBlockedResponse),
        (status = 400, description = "Invalid user id"),
        (status = 404, description = "Unknown account", body = ErrorBody)
    ),
    tag = "admin"
)]
pub async fn toggle_blocked(Path(id): Path<String>, pool: Extension<PgPool>) -> impl IntoResponse {
    let user_id = match Uuid::parse_str(id.trim()) {
        Ok(id) => id,
        Err(_) => return (StatusCode::BAD_REQUEST, "Invalid user id".to_string()).into_response(),
    };

    match storage::toggle_blocked(&pool, user_id).await {
        Ok(Some(blocked)) => (
            StatusCode::OK,
            Json(ToggleBlockedResponse {
                id: user_id.to_string(),
                blocked,
            }),
        )
            .into_response(),
        Ok(None) => AuthError::not_found("username", "unknown account").into_response(),
        Err(err) => {
            error!("Failed to toggle blocked flag: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Flip the verified flag of an account.
#[utoipa::path(
    post,
    path = "/v1/admin/users/{id}/verify",
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "Verified flag flipped", body = ToggleVerifiedResponse),
        (status = 400, description = "Invalid user id"),
        (status = 404, description = "Unknown account", body = ErrorBody)
    ),
    tag = "admin"
)]
pub async fn toggle_verified(Path(id): Path<String>, pool: Extension<PgPool>) -> impl IntoResponse {
    let user_id = match Uuid::parse_str(id.trim()) {
        Ok(id) => id,
        Err(_) => return (StatusCode::BAD_REQUEST, "Invalid user id".to_string()).into_response(),
    };

    match storage::toggle_verified(&pool, user_id).await {
        Ok(Some(verified)) => (
            StatusCode::OK,
            Json(ToggleVerifiedResponse {
                id: user_id.to_string(),
                verified,
            }),
        )
            .into_response(),
        Ok(None) => AuthError::not_found("username", "unknown account").into_response(),
        Err(err) => {
            error!("Failed to toggle verified flag: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
