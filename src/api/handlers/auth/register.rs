//! Registration and activation-mail resend.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use crate::api::mailer::ActivationMail;

use super::error::{AuthError, ErrorBody};
use super::state::AuthState;
use super::storage::{insert_user, lookup_user_by_email, RegisterOutcome};
use super::token::{build_activation_url, derive_activation_token, generate_salt, hash_password};
use super::types::{RegisterRequest, RegisterResponse, ResendActivationRequest};
use super::utils::{normalize_email, valid_email};

const MIN_PASSWORD_CHARS: usize = 8;

/// Register a new account and send its activation link.
///
/// The account row is persisted before the mail is attempted: a transport
/// failure surfaces to the caller but leaves the account in place, ready for
/// a later resend.
#[utoipa::path(
    post,
    path = "/v1/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, activation mail sent", body = RegisterResponse),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody),
        (status = 502, description = "Account created but activation mail not sent", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn register(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let request: RegisterRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return AuthError::validation("email", "invalid email address").into_response();
    }

    let password = request.password.expose_secret();
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return AuthError::validation("password", "password must be at least 8 characters")
            .into_response();
    }

    if password != request.repassword.expose_secret() {
        return AuthError::validation("repassword", "passwords do not match").into_response();
    }

    let salt = match generate_salt() {
        Ok(salt) => salt,
        Err(err) => {
            error!("Failed to generate salt: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    let password_hash = hash_password(&salt, password);

    let user_id = match insert_user(&pool, &email, &password_hash, &salt).await {
        Ok(RegisterOutcome::Created(id)) => id,
        Ok(RegisterOutcome::Conflict) => {
            let body = AuthError::validation("email", "a user with this email already exists").body();
            return (StatusCode::CONFLICT, Json(body)).into_response();
        }
        Err(err) => {
            error!("Failed to insert user: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let token = derive_activation_token(&salt, &email);
    let mail = ActivationMail {
        email: email.clone(),
        activate_url: build_activation_url(
            auth_state.config().frontend_base_url(),
            &email,
            &token,
        ),
    };

    if let Err(err) = auth_state.mailer().send_activation_mail(&mail) {
        error!("Failed to send activation mail: {err}");
        // The account exists; only the notification is missing.
        return AuthError::transport("email", "activation mail could not be sent").into_response();
    }

    (
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user_id.to_string(),
            email,
        }),
    )
        .into_response()
}

/// Re-send the activation link for a not-yet-activated account.
///
/// Always returns 204 to avoid account probing; the mail goes out only when
/// the account exists and is still unactivated.
#[utoipa::path(
    post,
    path = "/v1/users/resend-activation",
    request_body = ResendActivationRequest,
    responses(
        (status = 204, description = "Resend accepted")
    ),
    tag = "auth"
)]
pub async fn resend_activation(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<ResendActivationRequest>>,
) -> impl IntoResponse {
    let request: ResendActivationRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        // Keep the response opaque for invalid addresses too.
        return StatusCode::NO_CONTENT.into_response();
    }

    let user = match lookup_user_by_email(&pool, &email).await {
        Ok(user) => user,
        Err(err) => {
            error!("Failed to lookup user for resend: {err}");
            return StatusCode::NO_CONTENT.into_response();
        }
    };

    if let Some(user) = user {
        if !user.activated {
            let token = derive_activation_token(&user.salt, &user.email);
            let mail = ActivationMail {
                email: user.email.clone(),
                activate_url: build_activation_url(
                    auth_state.config().frontend_base_url(),
                    &user.email,
                    &token,
                ),
            };
            if let Err(err) = auth_state.mailer().send_activation_mail(&mail) {
                error!("Failed to resend activation mail: {err}");
            }
        }
    }

    StatusCode::NO_CONTENT.into_response()
}

#[cfg(test)]
mod tests {
    use super::super::state::{AuthConfig, AuthState};
    use super::{register, resend_activation};
    use crate::api::mailer::LogMailer;
    use anyhow::Result;
    use axum::extract::Extension;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::Json;
    use serde_json::json;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;

    fn auth_state() -> Arc<AuthState> {
        let config = AuthConfig::new("https://konto.dev".to_string());
        Arc::new(AuthState::new(config, Arc::new(LogMailer)))
    }

    #[tokio::test]
    async fn register_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = register(Extension(pool), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn register_rejects_invalid_email() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let request = serde_json::from_value(json!({
            "email": "not-an-email",
            "password": "hunter22",
            "repassword": "hunter22",
        }))?;
        let response = register(Extension(pool), Extension(auth_state()), Some(Json(request)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn register_rejects_short_password() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let request = serde_json::from_value(json!({
            "email": "alice@example.com",
            "password": "short",
            "repassword": "short",
        }))?;
        let response = register(Extension(pool), Extension(auth_state()), Some(Json(request)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn register_rejects_password_mismatch() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let request = serde_json::from_value(json!({
            "email": "alice@example.com",
            "password": "hunter22",
            "repassword": "hunter23",
        }))?;
        let response = register(Extension(pool), Extension(auth_state()), Some(Json(request)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn resend_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = resend_activation(Extension(pool), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn resend_opaque_for_invalid_email() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let request = serde_json::from_value(json!({"email": "not-an-email"}))?;
        let response = resend_activation(Extension(pool), Extension(auth_state()), Some(Json(request)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        Ok(())
    }
}
