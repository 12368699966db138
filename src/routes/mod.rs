pub mod admin;
pub mod chat;
pub mod comments;
pub mod posts;
pub mod session;
pub mod users;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full JSON API with request tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(admin::router())
        .merge(users::router())
        .merge(session::router())
        .merge(posts::router())
        .merge(comments::router())
        .merge(chat::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
