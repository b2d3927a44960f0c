use crate::state::AppState;
use axum::Router;

mod claims;
mod dto;
pub mod handlers;
pub mod jwt;
mod password;
pub mod services;

pub use jwt::RequireModerator;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
