//! Error taxonomy for the account flows.
//!
//! Every domain failure carries a `kind`, the offending input `field`, and a
//! `severity`. Warnings mark expected, non-catastrophic conditions (already
//! activated, link consumed, link expired) that callers render differently
//! from hard failures. Propagation is fail-fast: the first failing step of a
//! flow short-circuits the rest, and errors are never aggregated.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthErrorKind {
    Validation,
    Authentication,
    AccountState,
    Token,
    NotFound,
    Transport,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthError {
    kind: AuthErrorKind,
    field: &'static str,
    message: String,
    severity: Severity,
}

/// Wire shape exposed to callers.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
    pub field: String,
    pub severity: Severity,
}

impl AuthError {
    fn new(kind: AuthErrorKind, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            field,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::Validation, field, message)
    }

    pub fn authentication(field: &'static str, message: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::Authentication, field, message)
    }

    pub fn account_state(field: &'static str, message: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::AccountState, field, message)
    }

    pub fn token(field: &'static str, message: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::Token, field, message)
    }

    pub fn not_found(field: &'static str, message: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::NotFound, field, message)
    }

    pub fn transport(field: &'static str, message: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::Transport, field, message)
    }

    /// Downgrade to a warning, for expected conditions like a replayed link.
    #[must_use]
    pub fn warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }

    #[must_use]
    pub fn kind(&self) -> AuthErrorKind {
        self.kind
    }

    #[must_use]
    pub fn field(&self) -> &'static str {
        self.field
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match (self.kind, self.severity) {
            (AuthErrorKind::Validation, _) => StatusCode::BAD_REQUEST,
            (AuthErrorKind::Authentication, _) => StatusCode::UNAUTHORIZED,
            // An already-activated replay is a conflict, not a forbidden state.
            (AuthErrorKind::AccountState, Severity::Warning) => StatusCode::CONFLICT,
            (AuthErrorKind::AccountState, Severity::Error) => StatusCode::FORBIDDEN,
            // Consumed or expired links are gone; malformed ones are bad requests.
            (AuthErrorKind::Token, Severity::Warning) => StatusCode::GONE,
            (AuthErrorKind::Token, Severity::Error) => StatusCode::BAD_REQUEST,
            (AuthErrorKind::NotFound, _) => StatusCode::NOT_FOUND,
            (AuthErrorKind::Transport, _) => StatusCode::BAD_GATEWAY,
        }
    }

    #[must_use]
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            message: self.message.clone(),
            field: self.field.to_string(),
            severity: self.severity,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// Flow-level error: a domain failure with a wire shape, or an infrastructure
/// failure that only gets logged.
#[derive(Debug)]
pub(crate) enum ServiceError {
    Auth(AuthError),
    Internal(anyhow::Error),
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err)
    }
}

impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match self {
            Self::Auth(err) => err.into_response(),
            Self::Internal(err) => {
                error!("Failed to handle account request: {err}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
