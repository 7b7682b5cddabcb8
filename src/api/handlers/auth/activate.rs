//! Account activation via derived token.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;

use super::error::{AuthError, ErrorBody, ServiceError};
use super::storage::{lookup_user_by_email, mark_activated, UserRecord};
use super::token::derive_activation_token;
use super::types::ActivateRequest;
use super::utils::normalize_email;

/// Activate an account with the token from its activation link.
///
/// Replaying a correct link after the first success reports an
/// already-activated warning, not a hard failure.
#[utoipa::path(
    post,
    path = "/v1/users/activate",
    request_body = ActivateRequest,
    responses(
        (status = 204, description = "Account activated"),
        (status = 400, description = "Unknown account or token mismatch", body = ErrorBody),
        (status = 409, description = "Account already activated (warning)", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn activate(
    pool: Extension<PgPool>,
    payload: Option<Json<ActivateRequest>>,
) -> impl IntoResponse {
    let request: ActivateRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match run_activation(&pool, &request).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

async fn run_activation(pool: &PgPool, request: &ActivateRequest) -> Result<(), ServiceError> {
    let email = normalize_email(&request.email);
    let user = lookup_user_by_email(pool, &email).await?;
    let user = check_activation(user.as_ref(), request.token.trim())?;

    // The compare-and-set can still lose against a concurrent activation that
    // passed the same checks; report that the same way as a replay.
    if !mark_activated(pool, user.id).await? {
        return Err(already_activated().into());
    }

    Ok(())
}

/// Pre-checks, pure over an already-fetched record. The token is validated
/// before the activation state so a wrong token never learns whether the
/// account was activated.
fn check_activation<'a>(
    user: Option<&'a UserRecord>,
    token: &str,
) -> Result<&'a UserRecord, AuthError> {
    let Some(user) = user else {
        return Err(token_mismatch());
    };
    if derive_activation_token(&user.salt, &user.email) != token {
        return Err(token_mismatch());
    }
    if user.activated {
        return Err(already_activated());
    }
    Ok(user)
}

fn token_mismatch() -> AuthError {
    AuthError::token("activated", "account cannot be activated with this link")
}

fn already_activated() -> AuthError {
    AuthError::account_state("activated", "account is already activated").warning()
}

#[cfg(test)]
mod tests {
    use super::super::error::{AuthErrorKind, Severity};
    use super::super::storage::UserRecord;
    use super::super::token::derive_activation_token;
    use super::{activate, check_activation};
    use anyhow::Result;
    use axum::extract::Extension;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    fn user(activated: bool) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            password_hash: "hash".to_string(),
            salt: "s1".to_string(),
            activated,
            blocked: false,
            verified: false,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn missing_user_is_a_token_error() {
        let err = check_activation(None, "anything").expect_err("must fail");
        assert_eq!(err.kind(), AuthErrorKind::Token);
        assert_eq!(err.field(), "activated");
        assert_eq!(err.severity(), Severity::Error);
    }

    #[test]
    fn wrong_token_fails_regardless_of_activation_state() {
        for activated in [false, true] {
            let user = user(activated);
            let err = check_activation(Some(&user), "wrong-token").expect_err("must fail");
            assert_eq!(err.kind(), AuthErrorKind::Token);
        }
    }

    #[test]
    fn correct_token_on_activated_account_is_a_warning() {
        let user = user(true);
        let token = derive_activation_token(&user.salt, &user.email);
        let err = check_activation(Some(&user), &token).expect_err("must warn");
        assert_eq!(err.kind(), AuthErrorKind::AccountState);
        assert_eq!(err.field(), "activated");
        assert_eq!(err.severity(), Severity::Warning);
    }

    #[test]
    fn correct_token_on_fresh_account_passes() {
        let user = user(false);
        let token = derive_activation_token("s1", "a@x.com");
        let accepted = check_activation(Some(&user), &token).expect("must pass");
        assert_eq!(accepted.email, "a@x.com");
    }

    #[tokio::test]
    async fn activate_missing_payload() -> Result<()> {
        let pool = PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?;
        let response = activate(Extension(pool), None).await.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
