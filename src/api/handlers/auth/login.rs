//! Login check: can this email/password pair use the account right now?

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use secrecy::ExposeSecret;
use sqlx::PgPool;

use super::error::{AuthError, ErrorBody, ServiceError};
use super::storage::{lookup_user_by_email, UserRecord};
use super::token::hash_password;
use super::types::{LoginRequest, UserResponse};
use super::utils::normalize_email;

/// Check a login attempt.
///
/// Failure ordering is a contract: unknown account before wrong password
/// before not-activated before blocked, so callers can surface the most
/// specific actionable reason.
#[utoipa::path(
    post,
    path = "/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = UserResponse),
        (status = 401, description = "Wrong password", body = ErrorBody),
        (status = 403, description = "Account not activated or blocked", body = ErrorBody),
        (status = 404, description = "Unknown account", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn login(
    pool: Extension<PgPool>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match check(&pool, &request).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn check(pool: &PgPool, request: &LoginRequest) -> Result<UserResponse, ServiceError> {
    let email = normalize_email(&request.email);
    let user = lookup_user_by_email(pool, &email).await?;
    let user = verify_login(user.as_ref(), request.password.expose_secret())?;
    Ok(UserResponse::from(user))
}

/// The four ordered checks, pure over an already-fetched record.
fn verify_login<'a>(
    user: Option<&'a UserRecord>,
    password: &str,
) -> Result<&'a UserRecord, AuthError> {
    let Some(user) = user else {
        return Err(AuthError::not_found("username", "unknown account"));
    };
    if hash_password(&user.salt, password) != user.password_hash {
        return Err(AuthError::authentication("password", "wrong password"));
    }
    if !user.activated {
        return Err(AuthError::account_state(
            "activated",
            "account is not activated",
        ));
    }
    if user.blocked {
        return Err(AuthError::account_state(
            "blocked",
            "account is blocked, contact an administrator",
        ));
    }
    Ok(user)
}
