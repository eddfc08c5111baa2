// Shared test helpers; not all items used by every test binary.
#![allow(unused)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::Request;
use mygo_bot::catalog::{ImageCatalog, ImageEntry};
use mygo_bot::config::RepliesConfig;
use mygo_bot::conversation::JsonFileStore;
use mygo_bot::dispatch::{Dispatcher, ReplyDirective, ResponderSettings};
use mygo_bot::gateway::{GatewayState, build_router};
use mygo_bot::line::ReplySender;
use mygo_bot::providers::{ChatRequest, LLMProvider, LLMResponse, Message};
use std::collections::VecDeque;
use std::sync::Arc;
use tempfile::TempDir;

pub const SECRET: &str = "integration-secret";

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<Message>,
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

pub struct MockLLMProvider {
    responses: std::sync::Mutex<VecDeque<anyhow::Result<LLMResponse>>>,
    pub calls: std::sync::Mutex<Vec<RecordedCall>>,
    pub default_response: String,
}

impl MockLLMProvider {
    pub fn with_responses(responses: Vec<anyhow::Result<LLMResponse>>) -> Self {
        Self {
            responses: std::sync::Mutex::new(VecDeque::from(responses)),
            calls: std::sync::Mutex::new(Vec::new()),
            default_response: "Mock response".to_string(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LLMProvider for MockLLMProvider {
    async fn chat(&self, req: ChatRequest<'_>) -> anyhow::Result<LLMResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            messages: req.messages,
            model: req.model.map(|s| s.to_string()),
            temperature: req.temperature,
            max_tokens: req.max_tokens,
        });

        let response = self.responses.lock().unwrap().pop_front();
        response.unwrap_or_else(|| Ok(text_response(&self.default_response)))
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }
}

pub fn text_response(content: &str) -> LLMResponse {
    LLMResponse {
        content: Some(content.to_string()),
        total_tokens: None,
        finish_reason: None,
    }
}

/// Sender that remembers every reply instead of calling LINE.
#[derive(Default)]
pub struct RecordingSender {
    pub sent: std::sync::Mutex<Vec<(String, Vec<ReplyDirective>)>>,
}

#[async_trait]
impl ReplySender for RecordingSender {
    async fn reply(&self, reply_token: &str, messages: &[ReplyDirective]) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((reply_token.to_string(), messages.to_vec()));
        Ok(())
    }
}

pub fn sample_catalog() -> ImageCatalog {
    ImageCatalog::from_entries(vec![
        ImageEntry {
            name: "cat1".into(),
            url: "u1".into(),
        },
        ImageEntry {
            name: "cat-rare".into(),
            url: "u2".into(),
        },
    ])
}

pub fn responder_settings() -> ResponderSettings {
    ResponderSettings {
        model: Some("mock-model".into()),
        max_tokens: 512,
        temperature: 0.7,
        system_prompt: None,
    }
}

pub struct TestBot {
    pub app: Router,
    pub sender: Arc<RecordingSender>,
    pub store: Arc<JsonFileStore>,
    pub dir: TempDir,
}

/// Router wired like `serve`, with a recording sender and a temp store.
pub fn test_bot(provider: Option<Arc<dyn LLMProvider>>) -> TestBot {
    let dir = TempDir::new().unwrap();
    let mut dispatcher = Dispatcher::new(Arc::new(sample_catalog()), RepliesConfig::default());
    if let Some(provider) = provider {
        dispatcher = dispatcher.with_responder(provider, responder_settings());
    }
    let sender = Arc::new(RecordingSender::default());
    let store = Arc::new(JsonFileStore::new(dir.path().join("conversations.json")));
    let state = GatewayState::new(SECRET, Arc::new(dispatcher), sender.clone(), store.clone());
    TestBot {
        app: build_router(state, "/callback"),
        sender,
        store,
        dir,
    }
}

pub fn text_event(user_id: &str, reply_token: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "message",
        "mode": "active",
        "timestamp": 1_700_000_000_000_i64,
        "replyToken": reply_token,
        "source": {"type": "user", "userId": user_id},
        "message": {"type": "text", "id": "468789577898262530", "text": text}
    })
}

pub fn webhook_request(events: Vec<serde_json::Value>) -> Request<Body> {
    let body = serde_json::json!({"destination": "U0bot", "events": events}).to_string();
    let signature = mygo_bot::line::sign(SECRET, body.as_bytes()).unwrap();
    Request::builder()
        .method("POST")
        .uri("/callback")
        .header("content-type", "application/json")
        .header("x-line-signature", signature)
        .body(Body::from(body))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn read_json(resp: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(resp.into_body(), 1 << 20).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}
