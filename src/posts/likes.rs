use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    api::{ensure_same_reference, ApiJson, ApiQuery, Created, ListQuery, DEFAULT_LIKES_LIMIT},
    entities::{Like, NewLike},
    error::ApiError,
    state::AppState,
    store::{Filter, PublicRecord},
};

pub fn like_routes() -> Router<AppState> {
    Router::new().route("/posts/:post_id/likes", get(list_likes).post(like_post))
}

/// Likes are not deduplicated; liking twice stores two records.
#[instrument(skip(state, payload))]
pub async fn like_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    ApiJson(payload): ApiJson<NewLike>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let like = Like::try_from(payload)?;
    ensure_same_reference(Like::POST_ID, &like.post_id, &post_id)?;

    let id = state.repo::<Like>().create(&like).await?;
    info!(like_id = %id, user_id = %like.user_id, "post liked");
    Ok((StatusCode::CREATED, Json(Created { id })))
}

#[instrument(skip(state))]
pub async fn list_likes(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Vec<PublicRecord>>, ApiError> {
    let limit = query.resolve(DEFAULT_LIKES_LIMIT)?;
    let likes = state
        .repo::<Like>()
        .list(Filter::eq(Like::POST_ID, post_id), limit)
        .await?;
    Ok(Json(likes))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn repeated_likes_are_all_kept() {
        let app = TestApp::new();
        let like = json!({"post_id": "p1", "user_id": "u1"});
        let (first, _) = app.post("/api/posts/p1/likes", like.clone()).await;
        let (second, _) = app.post("/api/posts/p1/likes", like).await;
        assert_eq!(first, StatusCode::CREATED);
        assert_eq!(second, StatusCode::CREATED);

        let (_, listed) = app.get("/api/posts/p1/likes").await;
        assert_eq!(listed.as_array().unwrap().len(), 2);
        let (_, other) = app.get("/api/posts/p2/likes").await;
        assert_eq!(other, json!([]));
    }

    #[tokio::test]
    async fn like_needs_a_user() {
        let app = TestApp::new();
        let (status, body) = app
            .post("/api/posts/p1/likes", json!({"post_id": "p1"}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "field `user_id` is required");
    }

    #[tokio::test]
    async fn mismatched_post_is_rejected() {
        let app = TestApp::new();
        let (status, body) = app
            .post("/api/posts/p1/likes", json!({"post_id": "p2", "user_id": "u1"}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "InconsistentReference");
        assert_eq!(app.store.count("like").await, 0);
    }

    #[tokio::test]
    async fn likes_list_defaults_to_one_hundred() {
        let app = TestApp::new();
        for _ in 0..120 {
            app.post("/api/posts/p1/likes", json!({"post_id": "p1", "user_id": "u1"}))
                .await;
        }

        let (_, listed) = app.get("/api/posts/p1/likes").await;
        assert_eq!(listed.as_array().unwrap().len(), 100);
        let (_, limited) = app.get("/api/posts/p1/likes?limit=7").await;
        assert_eq!(limited.as_array().unwrap().len(), 7);
    }
}
