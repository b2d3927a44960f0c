use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, instrument};

use crate::{
    config::{DATABASE_NAME_VAR, DATABASE_URL_VAR},
    state::AppState,
};

const MAX_LISTED_COLLECTIONS: usize = 10;

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/test", get(diagnostics))
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Campus Social API is running" }))
}

/// Connectivity report. Environment variables are reported by presence only.
#[derive(Debug, Serialize)]
pub struct Diagnostics {
    pub backend: &'static str,
    pub store: &'static str,
    pub database: &'static str,
    pub connection_status: &'static str,
    pub database_url: &'static str,
    pub database_name: &'static str,
    pub collections: Vec<String>,
}

fn presence(var: &str) -> &'static str {
    if std::env::var_os(var).is_some() {
        "set"
    } else {
        "not set"
    }
}

#[instrument(skip(state))]
pub async fn diagnostics(State(state): State<AppState>) -> Json<Diagnostics> {
    let (database, connection_status, collections) = match state.store.collection_names().await {
        Ok(mut names) => {
            names.truncate(MAX_LISTED_COLLECTIONS);
            ("connected", "connected", names)
        }
        Err(e) => {
            error!(error = %e, "diagnostics could not reach the document store");
            ("unavailable", "not connected", Vec::new())
        }
    };

    Json(Diagnostics {
        backend: "running",
        store: state.store.backend_name(),
        database,
        connection_status,
        database_url: presence(DATABASE_URL_VAR),
        database_name: presence(DATABASE_NAME_VAR),
        collections,
    })
}
