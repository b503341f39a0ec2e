use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::hub::keyword_hub;
use super::support::{chat_and_image_catalog, mixed_catalog};
use crate::catalog::Catalog;
use crate::web::{router, SharedState};

fn app(catalog: Catalog) -> Router {
    router(SharedState::new(
        Arc::new(keyword_hub(catalog)),
        Duration::from_secs(3600),
    ))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(body) => Body::from(body.to_string()),
        None => Body::empty(),
    };
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

async fn new_session(app: &Router) -> String {
    let (status, body) = send(app, Method::POST, "/api/sessions", None).await;
    assert_eq!(status, StatusCode::OK);
    body["session_id"].as_str().unwrap().to_string()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_categories() {
    let app = app(mixed_catalog());
    let (status, body) = send(&app, Method::GET, "/api/categories", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["All", "Audio", "Code", "Image", "Misc"]));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_ranked_and_unranked() {
    let app = app(chat_and_image_catalog());
    let session = new_session(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tools/search",
        Some(json!({"session_id": session, "query": "generate images"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "ranked");
    assert_eq!(body["category"], "All");
    assert_eq!(body["cards"].as_array().unwrap().len(), 1);
    assert_eq!(body["cards"][0]["name"], "ImgGen");
    assert!(body["cards"][0]["similarity"].as_f64().unwrap() >= 0.4);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tools/search",
        Some(json!({"session_id": session, "category": "Chat"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "unranked");
    assert_eq!(body["cards"].as_array().unwrap().len(), 1);
    assert_eq!(body["cards"][0]["name"], "ChatBot");
    assert!(body["cards"][0].get("similarity").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_no_results() {
    let app = app(mixed_catalog());
    let session = new_session(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tools/search",
        Some(json!({"session_id": session, "query": "weather forecast"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["no_results"], true);
    assert_eq!(body["cards"], json!([]));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_errors() {
    let app = app(mixed_catalog());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tools/search",
        Some(json!({"session_id": "missing"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("missing"));

    let session = new_session(&app).await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/tools/search",
        Some(json!({"session_id": session, "category": "Nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bookmarks_are_isolated_per_session() {
    let app = app(mixed_catalog());
    let alice = new_session(&app).await;
    let bob = new_session(&app).await;
    assert_ne!(alice, bob);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/bookmarks/toggle",
        Some(json!({"session_id": alice, "tool_id": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"tool_id": 3, "state": "saved"}));

    let (_, saved) = send(&app, Method::GET, &format!("/api/sessions/{alice}/bookmarks"), None).await;
    assert_eq!(saved.as_array().unwrap().len(), 1);
    assert_eq!(saved[0]["name"], "Coder");

    let (_, saved) = send(&app, Method::GET, &format!("/api/sessions/{bob}/bookmarks"), None).await;
    assert_eq!(saved, json!([]));

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/tools/search",
        Some(json!({"session_id": bob, "category": "Code"})),
    )
    .await;
    assert_eq!(body["cards"][0]["state"], "unsaved");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_toggle_unknown_tool_is_ignored() {
    let app = app(mixed_catalog());
    let session = new_session(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/bookmarks/toggle",
        Some(json!({"session_id": session, "tool_id": 999})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"tool_id": 999, "state": null}));

    let (_, saved) = send(&app, Method::GET, &format!("/api/sessions/{session}/bookmarks"), None).await;
    assert_eq!(saved, json!([]));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_close_session_drops_bookmarks() {
    let app = app(mixed_catalog());
    let session = new_session(&app).await;

    send(
        &app,
        Method::POST,
        "/api/bookmarks/toggle",
        Some(json!({"session_id": session, "tool_id": 0})),
    )
    .await;

    let (status, _) = send(&app, Method::DELETE, &format!("/api/sessions/{session}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/api/sessions/{session}/bookmarks"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/sessions/{session}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
