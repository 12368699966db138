use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::store::User;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/session",
        get(current_session).put(set_session).delete(clear_session),
    )
}

async fn current_session(State(state): State<AppState>) -> AppResult<Json<User>> {
    state
        .store
        .get_current_session()
        .map(Json)
        .ok_or(AppError::NotFound)
}

async fn set_session(State(state): State<AppState>, Json(user): Json<User>) -> StatusCode {
    state.store.set_current_session(&user);
    StatusCode::NO_CONTENT
}

async fn clear_session(State(state): State<AppState>) -> StatusCode {
    state.store.clear_session();
    StatusCode::NO_CONTENT
}
