use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;

use crate::chat_memory::{ChatRole, ChatTurn};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct NewTurn {
    pub role: ChatRole,
    pub text: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/chat/{conversation}",
        get(recall).post(remember).delete(forget),
    )
}

async fn recall(
    State(state): State<AppState>,
    Path(conversation): Path<String>,
) -> Json<Vec<ChatTurn>> {
    let mut memory = state.chat_memory.lock().await;
    Json(memory.recall(&conversation, Utc::now()))
}

async fn remember(
    State(state): State<AppState>,
    Path(conversation): Path<String>,
    Json(turn): Json<NewTurn>,
) -> AppResult<StatusCode> {
    if turn.text.trim().is_empty() {
        return Err(AppError::BadRequest("text cannot be empty".into()));
    }

    let mut memory = state.chat_memory.lock().await;
    let now = Utc::now();
    memory.clear_stale(now);
    memory.remember(&conversation, turn.role, turn.text, now);
    Ok(StatusCode::CREATED)
}

async fn forget(
    State(state): State<AppState>,
    Path(conversation): Path<String>,
) -> AppResult<StatusCode> {
    let mut memory = state.chat_memory.lock().await;
    if memory.forget(&conversation) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
