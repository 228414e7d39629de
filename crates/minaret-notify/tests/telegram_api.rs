//! Error-classification tests for the Telegram adapter against a mock API.

use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use minaret_notify::{DeliveryChannel, DeliveryError, TelegramChannel};

#[tokio::test]
async fn successful_send_posts_chat_id_and_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_partial_json(serde_json::json!({
            "chat_id": "42",
            "text": "test body"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": { "message_id": 7 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let channel = TelegramChannel::with_base_url("123:abc", server.uri());
    channel.send("42", "test body").await.unwrap();
}

#[tokio::test]
async fn rate_limit_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "ok": false,
            "description": "Too Many Requests: retry after 5"
        })))
        .mount(&server)
        .await;

    let channel = TelegramChannel::with_base_url("123:abc", server.uri());
    let err = channel.send("42", "body").await.unwrap_err();
    assert!(matches!(err, DeliveryError::Retryable(msg) if msg.contains("Too Many Requests")));
}

#[tokio::test]
async fn server_error_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let channel = TelegramChannel::with_base_url("123:abc", server.uri());
    let err = channel.send("42", "body").await.unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn bad_chat_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "ok": false,
            "description": "Bad Request: chat not found"
        })))
        .mount(&server)
        .await;

    let channel = TelegramChannel::with_base_url("123:abc", server.uri());
    let err = channel.send("42", "body").await.unwrap_err();
    assert!(matches!(err, DeliveryError::Fatal(msg) if msg.contains("chat not found")));
}

#[tokio::test]
async fn unreachable_host_is_retryable() {
    let channel = TelegramChannel::with_base_url("123:abc", "http://127.0.0.1:9");
    let err = channel.send("42", "body").await.unwrap_err();
    assert!(err.is_retryable());
}
