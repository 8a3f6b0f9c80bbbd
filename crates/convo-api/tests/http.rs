use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use convo_api::AppStateInner;
use convo_db::Database;

fn test_app(temp: &TempDir) -> Router {
    let db = Arc::new(Database::open(&temp.path().join("chat.db")).unwrap());
    convo_api::router(Arc::new(AppStateInner { db }))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn create_then_resolve_channel() {
    let temp = TempDir::new().unwrap();
    let app = test_app(&temp);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/channels", json!({"name": "Team A"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = json_body(response).await;
    assert_eq!(created["name"], "Team A");
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 8);

    let response = app
        .oneshot(empty_request("GET", &format!("/channels/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["name"], "Team A");
}

#[tokio::test]
async fn unknown_channel_is_404() {
    let temp = TempDir::new().unwrap();
    let app = test_app(&temp);

    let response = app
        .oneshot(empty_request("GET", "/channels/NONEXISTENT"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_channel_name_is_rejected() {
    let temp = TempDir::new().unwrap();
    let app = test_app(&temp);

    let response = app
        .oneshot(json_request("POST", "/channels", json!({"name": "   "})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn message_roundtrip_in_order() {
    let temp = TempDir::new().unwrap();
    let app = test_app(&temp);

    let created = json_body(
        app.clone()
            .oneshot(json_request("POST", "/channels", json!({"name": "history"})))
            .await
            .unwrap(),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    for text in ["first", "second"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/channels/{id}/messages"),
                json!({"username": "alice", "text": text}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .oneshot(empty_request("GET", &format!("/channels/{id}/messages")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let messages = json_body(response).await;
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["text"], "first");
    assert_eq!(messages[1]["text"], "second");
    assert_eq!(messages[0]["username"], "alice");
    assert!(!messages[0]["timestamp"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn blank_message_never_reaches_the_store() {
    let temp = TempDir::new().unwrap();
    let app = test_app(&temp);

    let created = json_body(
        app.clone()
            .oneshot(json_request("POST", "/channels", json!({"name": "quiet"})))
            .await
            .unwrap(),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/channels/{id}/messages"),
            json!({"username": "alice", "text": "  \t "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let messages = json_body(
        app.oneshot(empty_request("GET", &format!("/channels/{id}/messages")))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(messages.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn join_is_idempotent_and_leave_of_absent_member_is_noop() {
    let temp = TempDir::new().unwrap();
    let app = test_app(&temp);

    let created = json_body(
        app.clone()
            .oneshot(json_request("POST", "/channels", json!({"name": "presence"})))
            .await
            .unwrap(),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/channels/{id}/members"),
                json!({"username": "alice"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let response = app
        .clone()
        .oneshot(empty_request(
            "DELETE",
            &format!("/channels/{id}/members/bob"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let members = json_body(
        app.oneshot(empty_request("GET", &format!("/channels/{id}/members")))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(members["usernames"], json!(["alice"]));
}
