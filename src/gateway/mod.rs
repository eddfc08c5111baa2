/// HTTP server for the bot.
///
/// Receives LINE webhooks, answers them through the dispatcher and the
/// reply client, and exposes the conversation log for inspection.
use std::sync::Arc;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::conversation::{self, ConversationStore, Role};
use crate::dispatch::{Dispatcher, normalize};
use crate::errors::{BotError, BotResult};
use crate::line::{ReplySender, SIGNATURE_HEADER, WebhookEvent, WebhookPayload};

/// Max webhook payload size: 1 MB.
pub const WEBHOOK_MAX_BODY: usize = 1_048_576;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct GatewayState {
    channel_secret: Arc<str>,
    dispatcher: Arc<Dispatcher>,
    sender: Arc<dyn ReplySender>,
    store: Arc<dyn ConversationStore>,
}

impl GatewayState {
    pub fn new(
        channel_secret: &str,
        dispatcher: Arc<Dispatcher>,
        sender: Arc<dyn ReplySender>,
        store: Arc<dyn ConversationStore>,
    ) -> Self {
        Self {
            channel_secret: Arc::from(channel_secret),
            dispatcher,
            sender,
            store,
        }
    }
}

/// One turn recorded while handling a webhook, written after all events.
struct PendingTurn {
    user_id: String,
    role: Role,
    content: String,
    at: DateTime<Utc>,
}

/// Build the router: the webhook at `webhook_path`, the admin endpoints
/// and the health check.
pub fn build_router(state: GatewayState, webhook_path: &str) -> Router {
    Router::new()
        .route(webhook_path, post(webhook_handler))
        .route(
            "/conversations",
            get(list_conversations_handler).delete(clear_conversations_handler),
        )
        .route(
            "/conversations/{id}",
            get(get_conversation_handler).delete(delete_conversation_handler),
        )
        .route("/api/health", get(health_handler))
        .with_state(state)
}

/// GET /api/health: health check endpoint.
///
/// `responder` is null when no Gemini key is configured.
async fn health_handler(State(state): State<GatewayState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "responder": state.dispatcher.responder_status(),
    }))
}

fn verify_signature(secret: &str, headers: &HeaderMap, body: &[u8]) -> BotResult<()> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(BotError::Signature)?;
    if crate::line::validate_signature(secret, signature, body) {
        Ok(())
    } else {
        Err(BotError::Signature)
    }
}

/// POST {webhookPath}: LINE webhook delivery.
///
/// Always answers 200 once the signature and payload check out: reply and
/// storage failures are logged, never surfaced to LINE.
async fn webhook_handler(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if body.len() > WEBHOOK_MAX_BODY {
        warn!("webhook: payload too large ({} bytes)", body.len());
        return StatusCode::PAYLOAD_TOO_LARGE.into_response();
    }

    if let Err(e) = verify_signature(&state.channel_secret, &headers, &body) {
        warn!("webhook: {}", e);
        return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("webhook: unparseable payload: {}", e);
            return (StatusCode::BAD_REQUEST, "invalid payload").into_response();
        }
    };

    debug!(
        "webhook: signature valid, events={}, payload_len={}",
        payload.events.len(),
        body.len()
    );

    let placeholder = &state.dispatcher.replies().non_text_placeholder;
    let mut turns = Vec::new();

    for event in &payload.events {
        let WebhookEvent::Message(event) = event else {
            continue;
        };
        let Some(text) = event.text() else {
            debug!("webhook: skipping non-text message");
            continue;
        };
        let user_id = event.conversation_key().to_string();

        turns.push(PendingTurn {
            user_id: user_id.clone(),
            role: Role::User,
            content: normalize(text),
            at: event.sent_at().unwrap_or_else(Utc::now),
        });

        let directive = state.dispatcher.dispatch(text).await;

        match event.reply_token.as_deref() {
            Some(token) => {
                if let Err(e) = state
                    .sender
                    .reply(token, std::slice::from_ref(&directive))
                    .await
                {
                    error!("webhook: failed to send {} reply: {:#}", directive.kind(), e);
                }
            }
            None => warn!("webhook: message event without reply token"),
        }

        turns.push(PendingTurn {
            user_id,
            role: Role::Assistant,
            content: directive.transcript(placeholder).to_string(),
            at: Utc::now(),
        });
    }

    if !turns.is_empty() {
        let count = turns.len();
        let saved = conversation::update(state.store.as_ref(), move |log| {
            for turn in turns {
                log.append_turn_at(&turn.user_id, turn.role, turn.content, turn.at);
            }
        })
        .await;
        match saved {
            Ok(()) => debug!("webhook: logged {} turn(s)", count),
            Err(e) => error!("webhook: failed to persist conversation log: {:#}", e),
        }
    }

    (StatusCode::OK, "OK").into_response()
}

fn store_error(e: &anyhow::Error) -> Response {
    error!("conversation store error: {:#}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": "conversation store unavailable"})),
    )
        .into_response()
}

fn not_found(id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "conversation not found", "id": id})),
    )
        .into_response()
}

/// GET /conversations: every transcript keyed by user id.
async fn list_conversations_handler(State(state): State<GatewayState>) -> Response {
    match state.store.load().await {
        Ok(log) => Json(log).into_response(),
        Err(e) => store_error(&e),
    }
}

/// GET /conversations/{id}
async fn get_conversation_handler(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Response {
    match state.store.load().await {
        Ok(log) => match log.get(&id) {
            Some(record) => Json(record).into_response(),
            None => not_found(&id),
        },
        Err(e) => store_error(&e),
    }
}

/// DELETE /conversations
async fn clear_conversations_handler(State(state): State<GatewayState>) -> Response {
    match conversation::update(state.store.as_ref(), |log| log.clear()).await {
        Ok(()) => {
            info!("all conversations deleted");
            Json(serde_json::json!({
                "status": "ok",
                "message": "all conversations deleted"
            }))
            .into_response()
        }
        Err(e) => store_error(&e),
    }
}

/// DELETE /conversations/{id}
async fn delete_conversation_handler(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Response {
    match conversation::update(state.store.as_ref(), |log| log.remove(&id)).await {
        Ok(true) => {
            info!("conversation deleted");
            Json(serde_json::json!({"status": "ok", "deleted": id})).into_response()
        }
        Ok(false) => not_found(&id),
        Err(e) => store_error(&e),
    }
}

/// Bind `host:port` and serve in a background task.
pub async fn start(
    host: &str,
    port: u16,
    webhook_path: &str,
    state: GatewayState,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = build_router(state, webhook_path);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {} (webhook at {})", addr, webhook_path);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("HTTP server error: {}", e);
        }
    });

    Ok(handle)
}
