use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument};

use crate::{
    api::{ApiJson, ApiQuery, Created, ListQuery, DEFAULT_LIMIT},
    auth::services::ensure_email_free,
    entities::{NewUser, User},
    error::ApiError,
    state::AppState,
    store::{Filter, PublicRecord},
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users).post(create_user))
}

/// Create a user without credentials. Such users can never log in.
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let user = User::try_from(payload)?;
    let users = state.repo::<User>();
    ensure_email_free(&users, &user.email).await?;

    let id = users.create(&user).await?;
    info!(user_id = %id, role = %user.role, "user created");
    Ok((StatusCode::CREATED, Json(Created { id })))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Vec<PublicRecord>>, ApiError> {
    let limit = query.resolve(DEFAULT_LIMIT)?;
    let users = state.repo::<User>().list(Filter::all(), limit).await?;
    Ok(Json(users))
}
