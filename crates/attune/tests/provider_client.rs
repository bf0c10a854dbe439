//! Integration tests for the provider client.
//!
//! These tests start a local axum server that emulates an OpenAI-compatible
//! chat-completions endpoint and point [`OpenRouterClient`] at it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use attune::prelude::*;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use serde_json::{Value, json};

#[derive(Clone)]
struct FakeProvider {
    status: StatusCode,
    reply: Value,
    delay: Duration,
    seen: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}

async fn completions(
    State(fake): State<FakeProvider>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> (StatusCode, axum::Json<Value>) {
    fake.seen.lock().unwrap().push((headers, body));
    tokio::time::sleep(fake.delay).await;
    (fake.status, axum::Json(fake.reply.clone()))
}

/// Helper: spawn a fake provider on a random port and return its endpoint.
async fn spawn_fake(
    status: StatusCode,
    reply: Value,
    delay: Duration,
) -> (String, Arc<Mutex<Vec<(HeaderMap, Value)>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let fake = FakeProvider {
        status,
        reply,
        delay,
        seen: seen.clone(),
    };
    let router = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(fake);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}/v1/chat/completions"), seen)
}

fn client_for(endpoint: &str) -> OpenRouterClient {
    let config = ProviderConfig::new("sk-test")
        .with_endpoint(endpoint)
        .with_model("test/model")
        .with_max_tokens(123)
        .with_temperature(0.25);
    OpenRouterClient::new(config).unwrap()
}

fn completion(content: Value) -> Value {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content}, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 5, "completion_tokens": 3, "total_tokens": 8}
    })
}

#[tokio::test]
async fn sends_fixed_parameters_and_returns_first_choice() {
    let (endpoint, seen) = spawn_fake(
        StatusCode::OK,
        completion(json!("Glad to hear it!")),
        Duration::ZERO,
    )
    .await;
    let client = client_for(&endpoint);

    let reply = client
        .complete(vec![Message::system("sys"), Message::user("I got the job")])
        .await
        .unwrap();
    assert_eq!(reply, "Glad to hear it!");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (headers, body) = &seen[0];
    assert_eq!(headers["authorization"], "Bearer sk-test");
    assert_eq!(headers["x-title"], "attune");
    assert_eq!(body["model"], "test/model");
    assert_eq!(body["max_tokens"], 123);
    assert_eq!(body["temperature"], 0.25);
    assert_eq!(body["messages"].as_array().unwrap().len(), 2);
    assert_eq!(body["messages"][0]["role"], "system");
}

#[tokio::test]
async fn null_content_returns_fallback_reply() {
    let (endpoint, _) = spawn_fake(StatusCode::OK, completion(Value::Null), Duration::ZERO).await;
    let reply = client_for(&endpoint)
        .complete(vec![Message::user("hi")])
        .await
        .unwrap();
    assert_eq!(reply, FALLBACK_REPLY);
}

#[tokio::test]
async fn no_choices_is_an_error() {
    let (endpoint, _) = spawn_fake(StatusCode::OK, json!({"choices": []}), Duration::ZERO).await;
    let err = client_for(&endpoint)
        .complete(vec![Message::user("hi")])
        .await
        .unwrap_err();
    assert!(err.contains("no completion"), "{err}");
}

#[tokio::test]
async fn http_error_status_is_an_error() {
    let (endpoint, _) = spawn_fake(
        StatusCode::BAD_GATEWAY,
        json!({"error": {"message": "upstream down"}}),
        Duration::ZERO,
    )
    .await;
    let err = client_for(&endpoint)
        .complete(vec![Message::user("hi")])
        .await
        .unwrap_err();
    assert!(err.contains("HTTP 502"), "{err}");
}

#[tokio::test]
async fn api_error_body_is_an_error() {
    let (endpoint, _) = spawn_fake(
        StatusCode::OK,
        json!({"error": {"message": "model not found"}}),
        Duration::ZERO,
    )
    .await;
    let err = client_for(&endpoint)
        .complete(vec![Message::user("hi")])
        .await
        .unwrap_err();
    assert!(err.contains("model not found"), "{err}");
}

#[tokio::test]
async fn slow_provider_times_out() {
    let (endpoint, _) = spawn_fake(
        StatusCode::OK,
        completion(json!("too late")),
        Duration::from_secs(5),
    )
    .await;
    let config = ProviderConfig::new("sk-test")
        .with_endpoint(&endpoint)
        .with_timeout(Duration::from_millis(200));
    let err = OpenRouterClient::new(config)
        .unwrap()
        .complete(vec![Message::user("hi")])
        .await
        .unwrap_err();
    assert!(err.starts_with("request failed"), "{err}");
}

#[tokio::test]
async fn unreachable_provider_is_an_error() {
    // Bind and drop a listener so the port is known to be closed.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let client = client_for(&format!("http://{addr}/v1/chat/completions"));
    let err = client
        .complete(vec![Message::user("hi")])
        .await
        .unwrap_err();
    assert!(err.starts_with("request failed"), "{err}");
}
