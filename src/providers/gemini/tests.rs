use super::*;
use crate::providers::base::Message;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FLASH_PATH: &str = "/models/gemini-2.0-flash:generateContent";

fn simple_chat_request(content: &str) -> ChatRequest<'_> {
    ChatRequest {
        messages: vec![Message::user(content)],
        model: None,
        max_tokens: 1024,
        temperature: 0.7,
    }
}

fn text_body(text: &str, tokens: u64) -> Value {
    json!({
        "candidates": [{
            "content": {
                "parts": [{"text": text}],
                "role": "model"
            },
            "finishReason": "STOP"
        }],
        "usageMetadata": {"totalTokenCount": tokens}
    })
}

#[tokio::test]
async fn test_chat_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FLASH_PATH))
        .and(header("x-goog-api-key", "test_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_body("你好！", 15)))
        .mount(&server)
        .await;

    let provider = GeminiProvider::with_base_url("test_key".to_string(), None, server.uri());
    let result = provider.chat(simple_chat_request("hi")).await.unwrap();

    assert_eq!(result.content.as_deref(), Some("你好！"));
    assert_eq!(result.total_tokens, Some(15));
    assert_eq!(result.finish_reason.as_deref(), Some("STOP"));
}

#[tokio::test]
async fn test_connect_failure_does_not_expose_key() {
    let provider = GeminiProvider::with_base_url(
        "SECRET_GEMINI_KEY_123".to_string(),
        None,
        "http://127.0.0.1:1/v1beta".to_string(),
    );
    let err = provider.chat(simple_chat_request("hi")).await.unwrap_err();
    let shown = format!("{:#}", err);
    assert!(shown.contains("Failed to send request"), "Error: {}", shown);
    assert!(!shown.contains("SECRET_GEMINI_KEY_123"), "Error: {}", shown);
    assert_eq!(provider.metrics().error_count, 1);
}

#[tokio::test]
async fn test_chat_joins_text_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FLASH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"parts": [{"text": "Hello, "}, {"text": "world"}], "role": "model"}
            }]
        })))
        .mount(&server)
        .await;

    let provider = GeminiProvider::with_base_url("k".to_string(), None, server.uri());
    let result = provider.chat(simple_chat_request("hi")).await.unwrap();
    assert_eq!(result.content.as_deref(), Some("Hello, world"));
    assert_eq!(result.total_tokens, None);
}

#[tokio::test]
async fn test_chat_no_candidates_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FLASH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .mount(&server)
        .await;

    let provider = GeminiProvider::with_base_url("k".to_string(), None, server.uri());
    let err = provider.chat(simple_chat_request("hi")).await.unwrap_err();
    assert!(err.to_string().contains("No candidates"));
}

#[tokio::test]
async fn test_system_message_sent_as_instruction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FLASH_PATH))
        .and(body_partial_json(json!({
            "systemInstruction": {"parts": [{"text": "Answer in Traditional Chinese."}]},
            "contents": [{"role": "user", "parts": [{"text": "hello"}]}],
            "generationConfig": {"maxOutputTokens": 1024}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_body("哈囉", 5)))
        .mount(&server)
        .await;

    let provider = GeminiProvider::with_base_url("k".to_string(), None, server.uri());
    let req = ChatRequest {
        messages: vec![
            Message::system("Answer in Traditional Chinese."),
            Message::user("hello"),
        ],
        model: None,
        max_tokens: 1024,
        temperature: 0.7,
    };
    let result = provider.chat(req).await.unwrap();
    assert_eq!(result.content.as_deref(), Some("哈囉"));
}

#[test]
fn test_assistant_role_mapped_to_model() {
    let req = ChatRequest {
        messages: vec![
            Message::user("hi"),
            Message {
                role: "assistant".into(),
                content: "hello".into(),
            },
        ],
        model: None,
        max_tokens: 64,
        temperature: 0.0,
    };
    let payload = GeminiProvider::build_payload(&req);
    assert_eq!(payload["contents"][1]["role"], "model");
    assert!(payload.get("systemInstruction").is_none());
}

#[tokio::test]
async fn test_chat_custom_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_body("Pro response", 8)))
        .mount(&server)
        .await;

    let provider = GeminiProvider::with_base_url(
        "k".to_string(),
        Some("gemini-1.5-pro".to_string()),
        server.uri(),
    );
    assert_eq!(provider.default_model(), "gemini-1.5-pro");
    let result = provider.chat(simple_chat_request("hi")).await.unwrap();
    assert_eq!(result.content.as_deref(), Some("Pro response"));
}

#[tokio::test]
async fn test_chat_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FLASH_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
        })))
        .mount(&server)
        .await;

    let provider = GeminiProvider::with_base_url("bad_key".to_string(), None, server.uri());
    let err = provider.chat(simple_chat_request("hi")).await.unwrap_err();
    assert!(err.to_string().contains("Authentication"), "Error: {}", err);
    assert_eq!(provider.metrics().error_count, 1);
}

#[tokio::test]
async fn test_chat_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FLASH_PATH))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&server)
        .await;

    let provider = GeminiProvider::with_base_url("k".to_string(), None, server.uri());
    let err = provider.chat(simple_chat_request("hi")).await.unwrap_err();
    match err.downcast_ref::<crate::errors::BotError>() {
        Some(crate::errors::BotError::RateLimit { retry_after }) => {
            assert_eq!(*retry_after, Some(7));
        }
        other => panic!("expected RateLimit, got {:?}", other),
    }
}

#[tokio::test]
async fn test_chat_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FLASH_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let provider = GeminiProvider::with_base_url("k".to_string(), None, server.uri());
    let err = provider.chat(simple_chat_request("hi")).await.unwrap_err();
    assert!(err.to_string().contains("upstream exploded"));
}

#[tokio::test]
async fn test_chat_metrics_updated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FLASH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_body("Hi", 12)))
        .mount(&server)
        .await;

    let provider = GeminiProvider::with_base_url("k".to_string(), None, server.uri());
    provider.chat(simple_chat_request("hi")).await.unwrap();
    provider.chat(simple_chat_request("again")).await.unwrap();

    let metrics = provider.metrics();
    assert_eq!(metrics.request_count, 2);
    assert_eq!(metrics.token_count, 24);
    assert_eq!(metrics.error_count, 0);
}
