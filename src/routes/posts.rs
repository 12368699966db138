use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::store::{Comment, LikeToggle, Post};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub user_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub user_id: String,
    pub content: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReaction {
    pub user_id: String,
    pub reaction: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(list_posts).post(save_post).put(save_posts))
        .route("/api/posts/{id}", get(get_post))
        .route(
            "/api/posts/{id}/comments",
            get(list_comments).post(add_comment),
        )
        .route("/api/posts/{id}/like", get(like_status).post(toggle_like))
        .route("/api/posts/{id}/reactions", post(add_reaction))
}

async fn list_posts(State(state): State<AppState>) -> Json<Vec<Post>> {
    Json(state.store.list_posts())
}

async fn save_post(State(state): State<AppState>, Json(post): Json<Post>) -> Json<Post> {
    state.store.save_post(&post);
    Json(post)
}

async fn save_posts(State(state): State<AppState>, Json(posts): Json<Vec<Post>>) -> StatusCode {
    state.store.save_posts(&posts);
    StatusCode::NO_CONTENT
}

async fn get_post(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<Post>> {
    state
        .store
        .get_post_by_id(&id)
        .map(Json)
        .ok_or(AppError::NotFound)
}

async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<Comment>> {
    Json(state.store.get_comments_by_post_id(&id))
}

async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<NewComment>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let comment = state
        .store
        .add_comment(&id, &input.user_id, &input.content)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn like_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(user): Query<UserRef>,
) -> Json<serde_json::Value> {
    let liked = state.store.has_user_liked_post(&id, &user.user_id);
    Json(json!({ "liked": liked }))
}

async fn toggle_like(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(user): Json<UserRef>,
) -> AppResult<Json<LikeToggle>> {
    Ok(Json(state.store.toggle_post_like(&id, &user.user_id)?))
}

async fn add_reaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<NewReaction>,
) -> AppResult<Response> {
    let updated = state
        .store
        .add_reaction(&id, &input.user_id, &input.reaction)?;

    Ok(match updated {
        Some(post) => Json(post).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}
