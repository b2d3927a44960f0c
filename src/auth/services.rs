use axum::extract::FromRef;
use tracing::{info, instrument, warn};

use super::{
    dto::{AuthResponse, Credentials, Registration},
    jwt::{AuthUser, JwtKeys},
    password::{dummy_hash, hash_password_blocking, verify_password_blocking},
};
use crate::{
    entities::User,
    error::ApiError,
    state::AppState,
    store::{Filter, PublicRecord, Repository, Stored},
};

async fn find_by_email(
    users: &Repository<User>,
    email: &str,
) -> Result<Option<Stored<User>>, ApiError> {
    Ok(users.find_one(Filter::eq(User::EMAIL, email)).await?)
}

/// Fails with `DuplicateEmail` when a user already holds `email`.
pub async fn ensure_email_free(users: &Repository<User>, email: &str) -> Result<(), ApiError> {
    if find_by_email(users, email).await?.is_some() {
        warn!(email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }
    Ok(())
}

fn issue(state: &AppState, stored: Stored<User>) -> Result<AuthResponse, ApiError> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(&stored.id, stored.entity.role)?;
    let refresh_token = keys.sign_refresh(&stored.id, stored.entity.role)?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: stored.into_public(),
    })
}

#[instrument(skip(state, input), fields(email = %input.email))]
pub async fn register(state: &AppState, input: Registration) -> Result<AuthResponse, ApiError> {
    let users = state.repo::<User>();
    ensure_email_free(&users, &input.email).await?;

    let hash = hash_password_blocking(input.password).await?;
    let id = users
        .create(&User::registered(input.name, input.email, hash))
        .await?;

    let stored = users
        .find_one(Filter::by_id(&id))
        .await?
        .ok_or_else(|| anyhow::anyhow!("registered user {id} not readable"))?;

    info!(user_id = %stored.id, "user registered");
    issue(state, stored)
}

#[instrument(skip(state, input), fields(email = %input.email))]
pub async fn login(state: &AppState, input: Credentials) -> Result<AuthResponse, ApiError> {
    let users = state.repo::<User>();
    let found = find_by_email(&users, &input.email).await?;
    let stored_hash = found
        .as_ref()
        .and_then(|stored| stored.entity.password_hash.clone());
    let has_credential = stored_hash.is_some();
    let hash = match stored_hash {
        Some(hash) => hash,
        None => dummy_hash().await?,
    };
    let verified = verify_password_blocking(input.password, hash).await?;

    let stored = match found {
        None => {
            warn!("login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
        Some(stored) if !has_credential => {
            warn!(user_id = %stored.id, "login for user without credentials");
            return Err(ApiError::InvalidCredentials);
        }
        Some(stored) if !verified => {
            warn!(user_id = %stored.id, "login invalid password");
            return Err(ApiError::InvalidCredentials);
        }
        Some(stored) => stored,
    };

    info!(user_id = %stored.id, "user logged in");
    issue(state, stored)
}

/// Exchange a refresh token for a new pair, picking up the stored role.
#[instrument(skip_all)]
pub async fn refresh(state: &AppState, refresh_token: &str) -> Result<AuthResponse, ApiError> {
    let claims = JwtKeys::from_ref(state)
        .verify_refresh(refresh_token)
        .map_err(|e| {
            warn!(error = %e, "refresh rejected");
            ApiError::Unauthorized("invalid or expired refresh token")
        })?;

    let stored = state
        .repo::<User>()
        .find_one(Filter::by_id(&claims.sub))
        .await?
        .ok_or(ApiError::Unauthorized("user not found"))?;
    issue(state, stored)
}

#[instrument(skip(state))]
pub async fn me(state: &AppState, caller: &AuthUser) -> Result<PublicRecord, ApiError> {
    let stored = state
        .repo::<User>()
        .find_one(Filter::by_id(&caller.id))
        .await?
        .ok_or(ApiError::Unauthorized("user not found"))?;
    Ok(stored.into_public())
}
