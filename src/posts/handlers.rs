use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    api::{ensure_same_reference, ApiJson, ApiQuery, Created, ListQuery, DEFAULT_LIMIT},
    entities::{NewPost, Post},
    error::ApiError,
    state::AppState,
    store::{Filter, PublicRecord},
};

pub fn post_routes() -> Router<AppState> {
    Router::new().route("/groups/:group_id/posts", get(list_posts).post(create_post))
}

#[instrument(skip(state, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    ApiJson(payload): ApiJson<NewPost>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let post = Post::try_from(payload)?;
    ensure_same_reference(Post::GROUP_ID, &post.group_id, &group_id)?;

    let id = state.repo::<Post>().create(&post).await?;
    info!(post_id = %id, author_id = %post.author_id, "post created");
    Ok((StatusCode::CREATED, Json(Created { id })))
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Vec<PublicRecord>>, ApiError> {
    let limit = query.resolve(DEFAULT_LIMIT)?;
    let posts = state
        .repo::<Post>()
        .list(Filter::eq(Post::GROUP_ID, group_id), limit)
        .await?;
    Ok(Json(posts))
}
