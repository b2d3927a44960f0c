//! Posts within a group and the comments and likes attached to them.

use crate::state::AppState;
use axum::Router;

pub mod comments;
pub mod handlers;
pub mod likes;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::post_routes())
        .merge(comments::comment_routes())
        .merge(likes::like_routes())
}
