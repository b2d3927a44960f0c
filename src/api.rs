//! Request plumbing shared by every resource.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{entities::ValidationError, error::ApiError};

pub const DEFAULT_LIMIT: i64 = 50;
pub const DEFAULT_LIKES_LIMIT: i64 = 100;
/// Hard cap on any list request.
pub const MAX_LIMIT: i64 = 500;

/// JSON body whose rejection is reported as a `ValidationError`.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Query string whose rejection is reported as a `ValidationError`.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

impl ListQuery {
    /// Caller's limit or `default`, clamped to [`MAX_LIMIT`].
    pub fn resolve(&self, default: i64) -> Result<i64, ValidationError> {
        match self.limit {
            None => Ok(default.min(MAX_LIMIT)),
            Some(limit) if limit < 1 => Err(ValidationError::InvalidLimit(limit)),
            Some(limit) => Ok(limit.min(MAX_LIMIT)),
        }
    }
}

/// Response body of every create endpoint.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Created {
    pub id: String,
}

/// The body's reference field must name the same parent as the path.
pub fn ensure_same_reference(
    field: &'static str,
    in_body: &str,
    in_path: &str,
) -> Result<(), ApiError> {
    if in_body == in_path {
        Ok(())
    } else {
        Err(ApiError::InconsistentReference { field })
    }
}
