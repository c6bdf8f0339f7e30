use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use db::DBService;
use serde_json::{Value, json};
use server::{AppState, app};
use services::services::{exchange::ExchangeRunner, generator::ScriptedGenerator};
use tower::ServiceExt;

async fn test_app() -> (Router, DBService) {
    let db = DBService::connect_in_memory()
        .await
        .expect("in-memory database");
    let generator = Arc::new(ScriptedGenerator::new(vec!["ab", "cd", "ef"]));
    let state = AppState {
        exchanges: ExchangeRunner::new(db.clone(), generator),
        db: db.clone(),
    };
    (app(state), db)
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_chat(app: &Router, title: &str) -> String {
    let response = app
        .clone()
        .oneshot(request("POST", "/chats", Some(json!({ "title": title }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn chat_crud_round_trip() {
    let (app, _db) = test_app().await;

    let chat_id = create_chat(&app, "First").await;

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/chats/{chat_id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["title"], "First");

    let response = app
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/chats/{chat_id}"),
            Some(json!({ "title": "Renamed" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["title"], "Renamed");

    let response = app
        .clone()
        .oneshot(request("DELETE", &format!("/chats/{chat_id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/chats/{chat_id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn chats_list_with_pagination_normalization() {
    let (app, _db) = test_app().await;
    for title in ["a", "b", "c"] {
        create_chat(&app, title).await;
    }

    let response = app
        .clone()
        .oneshot(request("GET", "/chats?offset=0&limit=0", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await.as_array().unwrap().len(), 3);

    let response = app
        .clone()
        .oneshot(request("GET", "/chats?limit=2", None))
        .await
        .unwrap();
    let listed = json_body(response).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["title"], "c");

    let response = app
        .clone()
        .oneshot(request("GET", "/chats?limit=-1", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn buffered_send_returns_and_persists_the_reply() {
    let (app, _db) = test_app().await;
    let chat_id = create_chat(&app, "talk").await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/chats/{chat_id}"),
            Some(json!({ "content": "hello" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["content"], "abcdef");

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/chats/{chat_id}/messages"), None))
        .await
        .unwrap();
    let messages = json_body(response).await;
    let messages = messages.as_array().unwrap().clone();
    assert_eq!(messages.len(), 2);
    // Newest first: the AI reply precedes the human message.
    assert_eq!(messages[0]["role"], "ai");
    assert_eq!(messages[0]["content"], "abcdef");
    assert_eq!(messages[1]["role"], "human");
    assert_eq!(messages[1]["content"], "hello");
}

#[tokio::test]
async fn stream_endpoint_emits_fragments_and_commits() {
    let (app, db) = test_app().await;
    let chat_id = create_chat(&app, "stream").await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/chats/{chat_id}/stream"),
            Some(json!({ "content": "hello" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    let ab = body.find("data: ab").expect("first fragment");
    let cd = body.find("data: cd").expect("second fragment");
    let ef = body.find("data: ef").expect("third fragment");
    assert!(ab < cd && cd < ef);

    // The body only ends once the exchange task has committed.
    let messages = db::models::chat_message::ChatMessage::find_transcript(
        &db.pool,
        chat_id.parse().unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content.as_deref(), Some("abcdef"));
}

#[tokio::test]
async fn message_endpoints_round_trip() {
    let (app, _db) = test_app().await;
    let chat_id = create_chat(&app, "edit").await;

    app.clone()
        .oneshot(request(
            "POST",
            &format!("/chats/{chat_id}"),
            Some(json!({ "content": "hello" })),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/chats/{chat_id}/messages"), None))
        .await
        .unwrap();
    let messages = json_body(response).await;
    let message_id = messages.as_array().unwrap()[0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/messages/{message_id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/messages/{message_id}"),
            Some(json!({ "content": "edited" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["content"], "edited");

    let response = app
        .clone()
        .oneshot(request("DELETE", &format!("/messages/{message_id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/messages/{message_id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn operations_on_a_missing_chat_are_not_found() {
    let (app, _db) = test_app().await;
    let ghost = uuid::Uuid::new_v4();

    for (method, body) in [
        ("GET", None),
        ("PATCH", Some(json!({ "title": "x" }))),
        ("DELETE", None),
        ("POST", Some(json!({ "content": "hi" }))),
    ] {
        let response = app
            .clone()
            .oneshot(request(method, &format!("/chats/{ghost}"), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method}");
    }
}

#[tokio::test]
async fn deleting_a_chat_cascades_through_the_api() {
    let (app, _db) = test_app().await;
    let chat_id = create_chat(&app, "doomed").await;

    app.clone()
        .oneshot(request(
            "POST",
            &format!("/chats/{chat_id}"),
            Some(json!({ "content": "hello" })),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/chats/{chat_id}/messages"), None))
        .await
        .unwrap();
    let messages = json_body(response).await;
    let message_id = messages.as_array().unwrap()[0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(request("DELETE", &format!("/chats/{chat_id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/chats/{chat_id}/messages"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/messages/{message_id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
