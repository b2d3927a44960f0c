use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument};

use crate::{
    api::{ApiJson, ApiQuery, Created, ListQuery, DEFAULT_LIMIT},
    auth::RequireModerator,
    entities::{Group, NewGroup},
    error::ApiError,
    state::AppState,
    store::{Filter, PublicRecord},
};

pub fn group_routes() -> Router<AppState> {
    Router::new().route("/groups", get(list_groups).post(create_group))
}

#[instrument(skip(state, caller, payload), fields(caller = %caller.id))]
pub async fn create_group(
    State(state): State<AppState>,
    RequireModerator(caller): RequireModerator,
    ApiJson(payload): ApiJson<NewGroup>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let group = Group::try_from(payload)?;
    let id = state.repo::<Group>().create(&group).await?;
    info!(group_id = %id, "group created");
    Ok((StatusCode::CREATED, Json(Created { id })))
}

#[instrument(skip(state))]
pub async fn list_groups(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Vec<PublicRecord>>, ApiError> {
    let limit = query.resolve(DEFAULT_LIMIT)?;
    let groups = state.repo::<Group>().list(Filter::all(), limit).await?;
    Ok(Json(groups))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::{entities::Role, test_support::TestApp};

    fn chess_club() -> serde_json::Value {
        json!({"name": "Chess", "description": "Weekly games", "created_by": "u1"})
    }

    #[tokio::test]
    async fn moderators_create_groups() {
        let app = TestApp::new();
        let token = app.token_for("u1", Role::Moderator);

        let (status, created) = app
            .request(Method::POST, "/api/groups", Some(chess_club()), Some(&token))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, listed) = app.get("/api/groups").await;
        assert_eq!(listed[0]["id"], created["id"]);
        assert_eq!(listed[0]["name"], "Chess");
        assert_eq!(listed[0]["description"], "Weekly games");
        assert_eq!(listed[0]["created_by"], "u1");
    }

    #[tokio::test]
    async fn anonymous_and_plain_users_are_turned_away() {
        let app = TestApp::new();

        let (status, _) = app.post("/api/groups", chess_club()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = app.token_for("u1", Role::User);
        let (status, body) = app
            .request(Method::POST, "/api/groups", Some(chess_club()), Some(&token))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Forbidden");
        assert_eq!(app.store.count("group").await, 0);
    }

    #[tokio::test]
    async fn group_without_creator_is_rejected() {
        let app = TestApp::new();
        let token = app.token_for("u1", Role::Admin);
        let (status, body) = app
            .request(Method::POST, "/api/groups", Some(json!({"name": "Chess"})), Some(&token))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "field `created_by` is required");
    }
}
