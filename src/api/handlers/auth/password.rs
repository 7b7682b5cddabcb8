//! Password change for an identified account.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use uuid::Uuid;

use super::error::{AuthError, ErrorBody, ServiceError};
use super::storage::{lookup_user_by_id, update_password};
use super::token::hash_password;
use super::types::ChangePasswordRequest;

const MIN_PASSWORD_CHARS: usize = 8;

/// Change the password of the account named in the request.
///
/// The caller identifies the account explicitly; there is no ambient
/// current-user context. The new hash is computed with the account's existing
/// salt, so the activation token derived from that salt stays valid.
#[utoipa::path(
    post,
    path = "/v1/users/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Wrong current password", body = ErrorBody),
        (status = 404, description = "Unknown account", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn change_password(
    pool: Extension<PgPool>,
    payload: Option<Json<ChangePasswordRequest>>,
) -> impl IntoResponse {
    let request: ChangePasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let user_id = match Uuid::parse_str(request.user_id.trim()) {
        Ok(id) => id,
        Err(_) => return (StatusCode::BAD_REQUEST, "Invalid user id".to_string()).into_response(),
    };

    if request.new_password.expose_secret().chars().count() < MIN_PASSWORD_CHARS {
        return AuthError::validation("password", "password must be at least 8 characters")
            .into_response();
    }

    match run_change(&pool, user_id, &request).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

async fn run_change(
    pool: &PgPool,
    user_id: Uuid,
    request: &ChangePasswordRequest,
) -> Result<(), ServiceError> {
    let user = lookup_user_by_id(pool, user_id)
        .await?
        .ok_or_else(|| AuthError::not_found("username", "unknown account"))?;

    if hash_password(&user.salt, request.old_password.expose_secret()) != user.password_hash {
        return Err(AuthError::authentication("password", "wrong current password").into());
    }

    // Salt is immutable after creation; only the hash changes.
    let password_hash = hash_password(&user.salt, request.new_password.expose_secret());
    if !update_password(pool, user.id, &password_hash).await? {
        return Err(AuthError::not_found("username", "unknown account").into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::change_password;
    use anyhow::Result;
    use axum::extract::Extension;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::Json;
    use serde_json::json;
    use sqlx::postgres::PgPoolOptions;

    #[tokio::test]
    async fn change_password_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = change_password(Extension(pool), None).await.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn change_password_invalid_user_id() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let request = serde_json::from_value(json!({
            "user_id": "not-a-uuid",
            "old_password": "hunter22",
            "new_password": "hunter23",
        }))?;
        let response = change_password(Extension(pool), Some(Json(request)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn change_password_rejects_short_new_password() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let request = serde_json::from_value(json!({
            "user_id": "00000000-0000-0000-0000-000000000000",
            "old_password": "hunter22",
            "new_password": "short",
        }))?;
        let response = change_password(Extension(pool), Some(Json(request)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
