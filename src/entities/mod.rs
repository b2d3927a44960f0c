//! Domain objects as they are accepted from callers and persisted.
//!
//! Every entity comes in two shapes: a `New*` request form whose fields are
//! all optional at the deserialization layer, and a validated form produced
//! by `TryFrom`. Only presence and enumerated values are checked here.

use std::{fmt, str::FromStr};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

mod content;
mod group;
mod user;

pub use content::{Comment, Like, NewComment, NewLike, NewPost, Post};
pub use group::{Group, NewGroup};
pub use user::{NewUser, User};

/// A persisted domain object and the collection it lives in.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field `{0}` is required")]
    MissingField(&'static str),
    #[error("role must be one of user, moderator, admin (got `{0}`)")]
    InvalidRole(String),
    #[error("limit must be a positive integer (got {0})")]
    InvalidLimit(i64),
    #[error("malformed request: {0}")]
    Malformed(String),
}

pub(crate) fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    value.ok_or(ValidationError::MissingField(field))
}

/// Permission tier carried by a user and by the tokens issued to them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }

    /// Moderators and admins may create groups.
    pub fn can_moderate(self) -> bool {
        matches!(self, Role::Moderator | Role::Admin)
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            other => Err(ValidationError::InvalidRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
