use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::store::{NewUser, User, UserPatch};

#[derive(Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/lookup", get(find_by_email))
        .route("/api/users/{id}", get(get_user).patch(update_user))
}

async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.store.list_users())
}

async fn create_user(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.store.create_user(new_user)?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn find_by_email(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> AppResult<Json<User>> {
    state
        .store
        .get_user_by_email(&query.email)
        .map(Json)
        .ok_or(AppError::NotFound)
}

async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<User>> {
    state
        .store
        .get_user_by_id(&id)
        .map(Json)
        .ok_or(AppError::NotFound)
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<UserPatch>,
) -> AppResult<Json<User>> {
    Ok(Json(state.store.update_user(&id, patch)?))
}
