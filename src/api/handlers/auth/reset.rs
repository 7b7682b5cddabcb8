//! Forgot/reset-password over the append-only reset ledger.
//!
//! A forgot-password request appends a record and mails its derived link; the
//! record is persisted before the mail is attempted, so a transport failure
//! still leaves a consumable record. Reading a record validates token, then
//! availability, then expiry, in that order. Consuming one is a single
//! transaction that compare-and-sets `available` and overwrites the password,
//! which closes the replay window between two concurrent resets.

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use crate::api::mailer::ResetPassMail;

use super::error::{AuthError, ErrorBody, ServiceError};
use super::state::AuthState;
use super::storage::{
    consume_reset_and_update_password, insert_reset_request, latest_reset_by_email,
    lookup_user_by_email, ResetPasswordOutcome, ResetRecord,
};
use super::token::{build_reset_url, derive_reset_token, hash_password};
use super::types::{
    ForgotPasswordRequest, ResetLinkParams, ResetPasswordRequest, ResetRecordResponse,
};
use super::utils::{normalize_email, valid_email};

const MIN_PASSWORD_CHARS: usize = 8;

/// Request a password reset link.
///
/// A ledger record is created for any well-formed address, without checking
/// that it belongs to a registered account.
#[utoipa::path(
    post,
    path = "/v1/users/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 204, description = "Reset record created, mail sent"),
        (status = 400, description = "Malformed email", body = ErrorBody),
        (status = 502, description = "Record created but mail not sent", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn forgot_password(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<ForgotPasswordRequest>>,
) -> impl IntoResponse {
    let request: ForgotPasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return AuthError::validation("email", "invalid email address").into_response();
    }

    let record = match insert_reset_request(&pool, &email).await {
        Ok(record) => record,
        Err(err) => {
            error!("Failed to insert reset request: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let token = derive_reset_token(&record.id, &record.email);
    let mail = ResetPassMail {
        email: record.email.clone(),
        reset_url: build_reset_url(auth_state.config().frontend_base_url(), &record.email, &token),
    };

    if let Err(err) = auth_state.mailer().send_reset_pass_mail(&mail) {
        error!("Failed to send reset mail: {err}");
        // The ledger record stays consumable; only the notification failed.
        return AuthError::transport("email", "reset mail could not be sent").into_response();
    }

    StatusCode::NO_CONTENT.into_response()
}

/// Validate a reset link and return its ledger record.
#[utoipa::path(
    get,
    path = "/v1/users/reset-password",
    params(ResetLinkParams),
    responses(
        (status = 200, description = "Link is valid", body = ResetRecordResponse),
        (status = 400, description = "Unknown or mismatched link", body = ErrorBody),
        (status = 410, description = "Link consumed or expired (warning)", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn get_reset_record(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    params: Query<ResetLinkParams>,
) -> impl IntoResponse {
    let email = normalize_email(&params.email);
    let ttl_hours = auth_state.config().reset_ttl_hours();

    let record = match latest_reset_by_email(&pool, &email, ttl_hours).await {
        Ok(record) => record,
        Err(err) => {
            error!("Failed to lookup reset request: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match validate_reset_record(record, params.token.trim()) {
        Ok(record) => (
            StatusCode::OK,
            Json(ResetRecordResponse {
                id: record.id.to_string(),
                email: record.email,
                available: record.available,
                created_at: record.created_at,
            }),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

/// Consume a reset link and overwrite the account password.
#[utoipa::path(
    post,
    path = "/v1/users/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 204, description = "Password reset, link consumed"),
        (status = 400, description = "Validation error or mismatched link", body = ErrorBody),
        (status = 404, description = "No account for this email", body = ErrorBody),
        (status = 410, description = "Link consumed or expired (warning)", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn reset_password(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<ResetPasswordRequest>>,
) -> impl IntoResponse {
    let request: ResetPasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    if request.new_password.expose_secret().chars().count() < MIN_PASSWORD_CHARS {
        return AuthError::validation("password", "password must be at least 8 characters")
            .into_response();
    }

    match run_reset(&pool, &auth_state, &request).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

async fn run_reset(
    pool: &PgPool,
    auth_state: &AuthState,
    request: &ResetPasswordRequest,
) -> Result<(), ServiceError> {
    let email = normalize_email(&request.email);
    let ttl_hours = auth_state.config().reset_ttl_hours();

    let record = latest_reset_by_email(pool, &email, ttl_hours).await?;
    let record = validate_reset_record(record, request.token.trim())?;

    let user = lookup_user_by_email(pool, &record.email)
        .await?
        .ok_or_else(|| AuthError::not_found("username", "no account for this email"))?;

    let password_hash = hash_password(&user.salt, request.new_password.expose_secret());
    match consume_reset_and_update_password(pool, record.id, user.id, &password_hash).await? {
        ResetPasswordOutcome::Applied => Ok(()),
        ResetPasswordOutcome::AlreadyUsed => Err(already_used().into()),
        ResetPasswordOutcome::UserMissing => {
            Err(AuthError::not_found("username", "no account for this email").into())
        }
    }
}

/// The three ordered checks, pure over an already-fetched record: token match,
/// then availability, then logical expiry.
fn validate_reset_record(
    record: Option<ResetRecord>,
    token: &str,
) -> Result<ResetRecord, AuthError> {
    let Some(record) = record else {
        return Err(token_mismatch());
    };
    if derive_reset_token(&record.id, &record.email) != token {
        return Err(token_mismatch());
    }
    if !record.available {
        return Err(already_used());
    }
    if record.expired {
        return Err(AuthError::token(
            "expire",
            "this reset link has expired, request a new one",
        )
        .warning());
    }
    Ok(record)
}

fn token_mismatch() -> AuthError {
    AuthError::token("token", "password reset cannot continue with this link")
}

fn already_used() -> AuthError {
    AuthError::token("available", "this reset link has already been used").warning()
}
