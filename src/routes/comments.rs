use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, post};
use axum::{Json, Router};

use crate::error::AppResult;
use crate::routes::posts::UserRef;
use crate::state::AppState;
use crate::store::LikeToggle;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/comments/{id}", delete(delete_comment))
        .route("/api/comments/{id}/like", post(toggle_like))
}

async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.store.delete_comment(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_like(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(user): Json<UserRef>,
) -> AppResult<Json<LikeToggle>> {
    Ok(Json(state.store.toggle_comment_like(&id, &user.user_id)?))
}
