use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    api::{ensure_same_reference, ApiJson, ApiQuery, Created, ListQuery, DEFAULT_LIMIT},
    entities::{Comment, NewComment},
    error::ApiError,
    state::AppState,
    store::{Filter, PublicRecord},
};

pub fn comment_routes() -> Router<AppState> {
    Router::new().route(
        "/posts/:post_id/comments",
        get(list_comments).post(create_comment),
    )
}

#[instrument(skip(state, payload))]
pub async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    ApiJson(payload): ApiJson<NewComment>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let comment = Comment::try_from(payload)?;
    ensure_same_reference(Comment::POST_ID, &comment.post_id, &post_id)?;

    let id = state.repo::<Comment>().create(&comment).await?;
    info!(comment_id = %id, "comment created");
    Ok((StatusCode::CREATED, Json(Created { id })))
}

#[instrument(skip(state))]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Vec<PublicRecord>>, ApiError> {
    let limit = query.resolve(DEFAULT_LIMIT)?;
    let comments = state
        .repo::<Comment>()
        .list(Filter::eq(Comment::POST_ID, post_id), limit)
        .await?;
    Ok(Json(comments))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn comment_round_trip() {
        let app = TestApp::new();
        let (status, created) = app
            .post(
                "/api/posts/p1/comments",
                json!({"post_id": "p1", "author_id": "u2", "content": "nice"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, listed) = app.get("/api/posts/p1/comments").await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["id"], created["id"]);
        assert_eq!(listed[0]["author_id"], "u2");
        assert_eq!(listed[0]["content"], "nice");
    }

    #[tokio::test]
    async fn mismatched_post_is_rejected() {
        let app = TestApp::new();
        let (status, body) = app
            .post(
                "/api/posts/p1/comments",
                json!({"post_id": "p9", "author_id": "u2", "content": "nice"}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "InconsistentReference");
        assert_eq!(app.store.count("comment").await, 0);
    }
}
