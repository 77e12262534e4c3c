//! User registration and login payloads

use serde::{Deserialize, Serialize};

/// Credentials sent to the login endpoint
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub cpf: String,
    pub password: String,
}

/// Flattened registration payload built from the two account-creation forms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub full_name: String,
    /// Digits only
    pub cpf: String,
    pub email: String,
    pub account_type: String,
    pub password: String,
    pub confirm_password: String,
}

/// What the user service tells us about the created user
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    #[serde(default, alias = "id")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Login answer: the user plus an access token
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user: LoginUser,
    pub token: AccessToken,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub access_token: String,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: i64,
}

/// Verification code confirmation for a freshly registered user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeRequest {
    pub code: String,
    pub user_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_payload_is_camel_case() {
        let payload = RegisterUser {
            full_name: "Maria Silva".to_string(),
            cpf: "12345678901".to_string(),
            email: "maria@example.com".to_string(),
            account_type: "CHECKING".to_string(),
            password: "secret123".to_string(),
            confirm_password: "secret123".to_string(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["fullName"], "Maria Silva");
        assert_eq!(json["confirmPassword"], "secret123");
        assert_eq!(json["accountType"], "CHECKING");
    }

    #[test]
    fn test_login_response_shape() {
        let json = r#"{"user":{"id":"u-1","fullName":"Maria"},"token":{"accessToken":"jwt","expiresIn":3600}}"#;
        let response: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.user.id, "u-1");
        assert_eq!(response.token.access_token, "jwt");
        assert_eq!(response.token.expires_in, 3600);
    }

    #[test]
    fn test_registered_user_accepts_id_alias() {
        let user: RegisteredUser = serde_json::from_str(r#"{"id":"u-9"}"#).unwrap();
        assert_eq!(user.user_id.as_deref(), Some("u-9"));
        let empty: RegisteredUser = serde_json::from_str("{}").unwrap();
        assert!(empty.user_id.is_none());
    }
}
