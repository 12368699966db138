//! HTTP surface tests, driven through the router without a socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use facecrook_store::config::Config;
use facecrook_store::kv::NullBackend;
use facecrook_store::routes;
use facecrook_store::state::AppState;
use facecrook_store::store::{LocalStore, StoreOptions};

fn test_app() -> Router {
    routes::app(AppState::new(LocalStore::in_memory(), Config::default()))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health_reports_backend() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["available"], true);
}

#[tokio::test]
async fn test_signup_and_lookup() {
    let app = test_app();

    let (status, ann) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({ "name": "Ann", "email": "ann@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(ann["id"].as_str().unwrap().starts_with("user_"));
    assert!(ann["createdAt"].is_string());

    let uri = "/api/users/lookup?email=ANN%40x.com";
    let (status, found) = send(&app, Method::GET, uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found, ann);

    let uri = format!("/api/users/{}", ann["id"].as_str().unwrap());
    let (status, by_id) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_id, ann);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({ "name": "Ann2", "email": "ann@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("ann@x.com"));
}

#[tokio::test]
async fn test_signup_without_name_is_400() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({ "email": "nobody@x.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, users) = send(&app, Method::GET, "/api/users", None).await;
    assert_eq!(users, json!([]));
}

#[tokio::test]
async fn test_update_user_and_unknown_user() {
    let app = test_app();
    let ann_json = Some(json!({ "name": "Ann" }));
    let (_, ann) = send(&app, Method::POST, "/api/users", ann_json).await;
    assert_eq!(ann["email"], "ann@facecrook.com");

    let uri = format!("/api/users/{}", ann["id"].as_str().unwrap());
    let (status, updated) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({ "bio": "satire only", "profilePicture": "🦀" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["bio"], "satire only");
    assert_eq!(updated["profilePicture"], "🦀");
    assert_eq!(updated["name"], "Ann");

    let (status, cleared) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({ "profilePicture": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["profilePicture"], Value::Null);
    assert_eq!(cleared["bio"], "satire only");

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/api/users/user_0_missing",
        Some(json!({ "bio": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_slot() {
    let app = test_app();
    let ann_json = Some(json!({ "name": "Ann" }));
    let (_, ann) = send(&app, Method::POST, "/api/users", ann_json).await;

    let (status, _) = send(&app, Method::GET, "/api/session", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::PUT, "/api/session", Some(ann.clone())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, session) = send(&app, Method::GET, "/api/session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session, ann);

    let (status, _) = send(&app, Method::DELETE, "/api/session", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, "/api/session", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comment_flow_updates_post_counter() {
    let app = test_app();
    let ann_json = Some(json!({ "name": "Ann" }));
    let (_, ann) = send(&app, Method::POST, "/api/users", ann_json).await;
    let user_id = ann["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/posts",
        Some(json!({ "id": "p1", "likes": 0, "comments": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, comment) = send(
        &app,
        Method::POST,
        "/api/posts/p1/comments",
        Some(json!({ "userId": user_id, "content": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["author"], "Ann");

    let (_, post) = send(&app, Method::GET, "/api/posts/p1", None).await;
    assert_eq!(post["comments"], 1);

    let (_, comments) = send(&app, Method::GET, "/api/posts/p1/comments", None).await;
    assert_eq!(comments.as_array().unwrap().len(), 1);

    let (status, toggled) = send(
        &app,
        Method::POST,
        &format!("/api/comments/{}/like", comment["id"].as_str().unwrap()),
        Some(json!({ "userId": user_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled, json!({ "liked": true, "likeCount": 1 }));

    let uri = format!("/api/comments/{}", comment["id"].as_str().unwrap());
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, post) = send(&app, Method::GET, "/api/posts/p1", None).await;
    assert_eq!(post["comments"], 0);
}

#[tokio::test]
async fn test_comment_by_unknown_user_is_404() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/posts/p1/comments",
        Some(json!({ "userId": "user_0_ghost", "content": "boo" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("user_0_ghost"));
}

#[tokio::test]
async fn test_like_toggle_and_reactions() {
    let app = test_app();
    send(&app, Method::POST, "/api/posts", Some(json!({ "id": "p1" }))).await;

    let like = Some(json!({ "userId": "u1" }));
    let (_, first) = send(&app, Method::POST, "/api/posts/p1/like", like.clone()).await;
    assert_eq!(first, json!({ "liked": true, "likeCount": 1 }));

    let (_, status_body) = send(&app, Method::GET, "/api/posts/p1/like?userId=u1", None).await;
    assert_eq!(status_body["liked"], true);

    let (_, second) = send(&app, Method::POST, "/api/posts/p1/like", like).await;
    assert_eq!(second, json!({ "liked": false, "likeCount": 0 }));

    let (status, post) = send(
        &app,
        Method::POST,
        "/api/posts/p1/reactions",
        Some(json!({ "userId": "u1", "reaction": "🔥" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(post["reactions"]["fire"], 1);
    assert_eq!(post["reactions"]["heart"], 0);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/posts/p1/reactions",
        Some(json!({ "userId": "u1", "reaction": "👎" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/posts/missing/reactions",
        Some(json!({ "userId": "u1", "reaction": "❤️" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bulk_save_stats_and_clear() {
    let app = test_app();

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/posts",
        Some(json!([{ "id": "a" }, { "id": "b", "celebrityId": "kim" }])),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, posts) = send(&app, Method::GET, "/api/posts", None).await;
    assert_eq!(posts[0]["author"], Value::Null);
    assert_eq!(posts[1]["celebrityId"], "kim");
    assert!(posts[1].get("author").is_none());

    let (_, stats) = send(&app, Method::GET, "/api/stats", None).await;
    assert_eq!(stats, json!({ "users": 0, "posts": 2, "comments": 0, "likes": 0 }));

    let (status, _) = send(&app, Method::DELETE, "/api/data", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, stats) = send(&app, Method::GET, "/api/stats", None).await;
    assert_eq!(stats["posts"], 0);
}

#[tokio::test]
async fn test_unavailable_storage() {
    let store = LocalStore::new(Arc::new(NullBackend), StoreOptions::default());
    let app = routes::app(AppState::new(store, Config::default()));

    let (status, users) = send(&app, Method::GET, "/api/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users, json!([]));

    let ann_json = Some(json!({ "name": "Ann" }));
    let (status, _) = send(&app, Method::POST, "/api/users", ann_json).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_chat_memory_endpoints() {
    let app = test_app();

    for text in ["hello", "are you real?"] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/chat/kanye",
            Some(json!({ "role": "user", "text": text })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, turns) = send(&app, Method::GET, "/api/chat/kanye", None).await;
    assert_eq!(status, StatusCode::OK);
    let turns = turns.as_array().unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0]["text"], "hello");
    assert_eq!(turns[1]["role"], "user");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/chat/kanye",
        Some(json!({ "role": "assistant", "text": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, "/api/chat/kanye", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, "/api/chat/kanye", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
