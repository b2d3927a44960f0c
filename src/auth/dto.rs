use serde::{Deserialize, Serialize};

use crate::entities::{required, ValidationError};
use crate::store::PublicRecord;

/// Request body for user registration.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Register input after presence checks.
#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = ValidationError;

    fn try_from(req: RegisterRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: required(req.name, "name")?,
            email: required(req.email, "email")?,
            password: required(req.password, "password")?,
        })
    }
}

/// Login input after presence checks.
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for Credentials {
    type Error = ValidationError;

    fn try_from(req: LoginRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            email: required(req.email, "email")?,
            password: required(req.password, "password")?,
        })
    }
}

/// Response returned after login, register or refresh: the user's public
/// view with the token pair alongside.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(flatten)]
    pub user: PublicRecord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn auth_response_flattens_user_fields() {
        let mut user = PublicRecord::new();
        user.insert("id".into(), json!("abc"));
        user.insert("email".into(), json!("a@x.com"));
        let response = AuthResponse {
            access_token: "at".into(),
            refresh_token: "rt".into(),
            user,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["id"], "abc");
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["access_token"], "at");
    }

    #[test]
    fn registration_requires_password() {
        let err = Registration::try_from(RegisterRequest {
            name: Some("A".into()),
            email: Some("a@x.com".into()),
            password: None,
        })
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("password"));
    }
}
