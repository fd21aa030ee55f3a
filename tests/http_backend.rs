use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use vendorai_lib::api::{HttpReplyBackend, ReplyBackend};
use vendorai_lib::chat::{ChatSession, APOLOGY};
use vendorai_lib::models::Sender;
use vendorai_lib::render::RecordingRenderer;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend(server: &MockServer) -> HttpReplyBackend {
    HttpReplyBackend::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn posts_message_and_reads_reply() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "message": "best spot for chai?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "Near the bus stand." })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let reply = backend(&mock_server).fetch_reply("best spot for chai?").await.unwrap();
    assert_eq!(reply, "Near the bus stand.");
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "Failed to process the request" })))
        .mount(&mock_server)
        .await;

    let err = backend(&mock_server).fetch_reply("hi").await.unwrap_err();
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn malformed_body_is_an_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not valid json"))
        .mount(&mock_server)
        .await;

    assert!(backend(&mock_server).fetch_reply("hi").await.is_err());
}

#[tokio::test]
async fn missing_reply_field_is_an_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "wrong field" })))
        .mount(&mock_server)
        .await;

    assert!(backend(&mock_server).fetch_reply("hi").await.is_err());
}

#[tokio::test]
async fn chat_session_over_http_success_and_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({ "message": "hello" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "X" })))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({ "message": "boom" })))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let renderer = Arc::new(RecordingRenderer::new());
    let chat = ChatSession::new(Arc::new(backend(&mock_server)), renderer);

    chat.send_user_message("hello").unwrap().wait().await;
    chat.send_user_message("boom").unwrap().wait().await;

    let history: Vec<(Sender, String)> = chat
        .history()
        .await
        .into_iter()
        .map(|m| (m.sender, m.text))
        .collect();
    assert_eq!(
        history,
        vec![
            (Sender::User, "hello".to_string()),
            (Sender::Bot, "X".to_string()),
            (Sender::User, "boom".to_string()),
            (Sender::Bot, APOLOGY.to_string()),
        ]
    );
    assert!(!chat.is_typing());
}

#[tokio::test]
async fn unreachable_backend_yields_apology() {
    // Nothing should be listening on the discard port
    let backend = HttpReplyBackend::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let chat = ChatSession::new(Arc::new(backend), Arc::new(RecordingRenderer::new()));

    let reply = chat.send_user_message("anyone there?").unwrap().wait().await.unwrap();
    assert_eq!(reply.text, APOLOGY);
}
