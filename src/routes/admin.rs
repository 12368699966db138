use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::state::AppState;
use crate::store::StoreStats;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/stats", get(stats))
        .route("/api/data", delete(clear_all))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "storage": state.store.backend_name(),
        "available": state.store.is_available(),
    }))
}

async fn stats(State(state): State<AppState>) -> Json<StoreStats> {
    Json(state.store.get_stats())
}

async fn clear_all(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.store.clear_all_data()?;
    Ok(StatusCode::NO_CONTENT)
}
