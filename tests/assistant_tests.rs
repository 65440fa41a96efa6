use portfolio_backend::config::OpenAiConfig;
use portfolio_backend::error::UpstreamError;
use portfolio_backend::services::assistant::{Assistant, EMPTY_REPLY, OpenAiAssistant, PORTFOLIO_CONTEXT};

use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

/// Spawn a local stand-in for the completions endpoint and return its URL.
async fn fake_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/v1/chat/completions")
}

fn assistant(api_url: String) -> OpenAiAssistant {
    OpenAiAssistant::new(OpenAiConfig {
        api_key: Some("test-key".to_string()),
        model: "gpt-4o".to_string(),
        api_url,
    })
}

#[tokio::test]
async fn test_reply_sends_prompt_and_latest_message_only() {
    let seen: Arc<Mutex<Option<(HeaderMap, Value)>>> = Arc::new(Mutex::new(None));
    let captured = seen.clone();
    let router = Router::new().route(
        "/v1/chat/completions",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let captured = captured.clone();
            async move {
                *captured.lock().unwrap() = Some((headers, body));
                Json(json!({
                    "choices": [{ "message": { "role": "assistant", "content": "Python, ML" } }]
                }))
            }
        }),
    );
    let url = fake_upstream(router).await;

    let reply = assistant(url).reply("What are your skills?").await.unwrap();
    assert_eq!(reply, "Python, ML");

    let (headers, body) = seen.lock().unwrap().take().unwrap();
    let auth = headers.get("authorization").unwrap().to_str().unwrap();
    assert_eq!(auth, "Bearer test-key");
    assert_eq!(body["model"], "gpt-4o");
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[0]["content"], PORTFOLIO_CONTEXT);
    assert_eq!(messages[1]["content"], "What are your skills?");
}

#[tokio::test]
async fn test_error_status_is_upstream_error() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
    );
    let url = fake_upstream(router).await;

    let err = assistant(url).reply("hi").await.unwrap_err();
    match err {
        UpstreamError::Status { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid api key"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_garbage_body_is_decode_error() {
    let router = Router::new().route("/v1/chat/completions", post(|| async { "not json" }));
    let url = fake_upstream(router).await;

    let err = assistant(url).reply("hi").await.unwrap_err();
    assert!(matches!(err, UpstreamError::Decode(_)));
}

#[tokio::test]
async fn test_empty_content_gets_canned_reply() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async { Json(json!({ "choices": [{ "message": { "content": null } }] })) }),
    );
    let url = fake_upstream(router).await;

    let reply = assistant(url).reply("hi").await.unwrap();
    assert_eq!(reply, EMPTY_REPLY);
}

#[tokio::test]
async fn test_unreachable_upstream_is_request_error() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let err = assistant(format!("http://127.0.0.1:{port}/v1/chat/completions"))
        .reply("hi")
        .await
        .unwrap_err();
    assert!(matches!(err, UpstreamError::Request(_)));
}

#[tokio::test]
async fn test_no_choices_is_decode_error() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async { Json(json!({ "choices": [] })) }),
    );
    let url = fake_upstream(router).await;

    let err = assistant(url).reply("hi").await.unwrap_err();
    assert!(matches!(err, UpstreamError::Decode(_)));
}

#[tokio::test]
async fn test_whitespace_content_is_passed_through() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async { Json(json!({ "choices": [{ "message": { "content": " " } }] })) }),
    );
    let url = fake_upstream(router).await;

    assert_eq!(assistant(url).reply("hi").await.unwrap(), " ");
}
