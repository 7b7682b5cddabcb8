//! OpenAPI document for the account API.

use utoipa::OpenApi;

use crate::api::handlers::auth::types::{
    ActivateRequest, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, RegisterRequest,
    RegisterResponse, ResendActivationRequest, ResetPasswordRequest, ResetRecordResponse,
    ToggleBlockedResponse, ToggleVerifiedResponse, UserResponse,
};
use crate::api::handlers::auth::{ErrorBody, Severity};
use crate::api::handlers::{auth, health};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::register::register,
        auth::register::resend_activation,
        auth::activate::activate,
        auth::login::login,
        auth::password::change_password,
        auth::reset::forgot_password,
        auth::reset::get_reset_record,
        auth::reset::reset_password,
        auth::admin::toggle_blocked,
        auth::admin::toggle_verified,
    ),
    components(schemas(
        ActivateRequest,
        ChangePasswordRequest,
        ErrorBody,
        ForgotPasswordRequest,
        LoginRequest,
        RegisterRequest,
        RegisterResponse,
        ResendActivationRequest,
        ResetPasswordRequest,
        ResetRecordResponse,
        Severity,
        ToggleBlockedResponse,
        ToggleVerifiedResponse,
        UserResponse,
    )),
    tags(
        (name = "konto", description = "Account security and token workflows"),
        (name = "auth", description = "Registration, activation, login, and password flows"),
        (name = "admin", description = "Administrative account-state toggles")
    )
)]
pub struct ApiDoc;
