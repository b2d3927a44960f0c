use serde::{Deserialize, Serialize};

use super::{required, Entity, Role, ValidationError};

/// User record in the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: Role,
    /// Argon2 PHC string; absent for users created without credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

impl Entity for User {
    const COLLECTION: &'static str = "user";
}

impl User {
    pub const EMAIL: &'static str = "email";

    /// A self-registered user: plain `user` role, no avatar.
    pub fn registered(name: String, email: String, password_hash: String) -> Self {
        Self {
            name,
            email,
            avatar_url: None,
            role: Role::User,
            password_hash: Some(password_hash),
        }
    }
}

/// Request body for `POST /api/users`.
///
/// Carries no credential field; hashes are only set by registration.
#[derive(Debug, Default, Deserialize)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<String>,
}

impl TryFrom<NewUser> for User {
    type Error = ValidationError;

    fn try_from(input: NewUser) -> Result<Self, Self::Error> {
        let role = match input.role {
            Some(role) => role.parse()?,
            None => Role::default(),
        };
        Ok(Self {
            name: required(input.name, "name")?,
            email: required(input.email, "email")?,
            avatar_url: input.avatar_url,
            role,
            password_hash: None,
        })
    }
}
