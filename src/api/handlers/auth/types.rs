//! Request/response types for the account endpoints.
//!
//! Password-bearing fields deserialize into `SecretString` so derived `Debug`
//! output never leaks them into logs.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::storage::UserRecord;

#[derive(ToSchema, Deserialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    #[schema(value_type = String)]
    pub password: SecretString,
    #[schema(value_type = String)]
    pub repassword: SecretString,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterResponse {
    pub id: String,
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ActivateRequest {
    pub email: String,
    pub token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResendActivationRequest {
    pub email: String,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    #[schema(value_type = String)]
    pub password: SecretString,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub activated: bool,
    pub blocked: bool,
    pub verified: bool,
    pub created_at: String,
}

impl From<&UserRecord> for UserResponse {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            activated: user.activated,
            blocked: user.blocked,
            verified: user.verified,
            created_at: user.created_at.clone(),
        }
    }
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct ChangePasswordRequest {
    pub user_id: String,
    #[schema(value_type = String)]
    pub old_password: SecretString,
    #[schema(value_type = String)]
    pub new_password: SecretString,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(IntoParams, Deserialize, Debug)]
pub struct ResetLinkParams {
    pub email: String,
    pub token: String,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub token: String,
    #[schema(value_type = String)]
    pub new_password: SecretString,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetRecordResponse {
    pub id: String,
    pub email: String,
    pub available: bool,
    pub created_at: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ToggleBlockedResponse {
    pub id: String,
    pub blocked: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ToggleVerifiedResponse {
    pub id: String,
    pub verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use secrecy::ExposeSecret;
    use serde_json::json;

    #[test]
    fn register_request_deserializes() -> Result<()> {
        let request: RegisterRequest = serde_json::from_value(json!({
            "email": "alice@example.com",
            "password": "hunter22",
            "repassword": "hunter22",
        }))?;
        assert_eq!(request.email, "alice@example.com");
        assert_eq!(request.password.expose_secret(), "hunter22");
        Ok(())
    }

    #[test]
    fn register_request_debug_redacts_password() -> Result<()> {
        let request: RegisterRequest = serde_json::from_value(json!({
            "email": "alice@example.com",
            "password": "hunter22",
            "repassword": "hunter22",
        }))?;
        let rendered = format!("{request:?}");
        assert!(!rendered.contains("hunter22"));
        assert!(rendered.contains("alice@example.com"));
        Ok(())
    }

    #[test]
    fn activate_request_round_trips() -> Result<()> {
        let request = ActivateRequest {
            email: "bob@example.com".to_string(),
            token: "tok".to_string(),
        };
        let value = serde_json::to_value(&request)?;
        let decoded: ActivateRequest = serde_json::from_value(value)?;
        assert_eq!(decoded.email, "bob@example.com");
        assert_eq!(decoded.token, "tok");
        Ok(())
    }

    #[test]
    fn user_response_from_record() {
        let record = UserRecord {
            id: uuid::Uuid::nil(),
            email: "a@x.com".to_string(),
            password_hash: "hash".to_string(),
            salt: "s1".to_string(),
            activated: true,
            blocked: false,
            verified: true,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        };
        let response = UserResponse::from(&record);
        assert_eq!(response.id, uuid::Uuid::nil().to_string());
        assert!(response.activated);
        assert!(!response.blocked);
        assert!(response.verified);
        // The wire shape never carries the hash or the salt.
        let value = serde_json::to_value(&response).expect("serialize");
        assert!(value.get("password_hash").is_none());
        assert!(value.get("salt").is_none());
    }

    #[test]
    fn change_password_request_debug_redacts_both_passwords() -> Result<()> {
        let request: ChangePasswordRequest = serde_json::from_value(json!({
            "user_id": "00000000-0000-0000-0000-000000000000",
            "old_password": "old-secret",
            "new_password": "new-secret",
        }))?;
        let rendered = format!("{request:?}");
        assert!(!rendered.contains("old-secret"));
        assert!(!rendered.contains("new-secret"));
        Ok(())
    }
}
