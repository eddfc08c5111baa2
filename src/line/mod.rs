//! LINE Messaging API: webhook payloads, signature checks and the reply client.

mod client;
pub mod events;

pub use client::{LineClient, to_line_message};
pub use events::{EventMessage, EventSource, MessageEvent, WebhookEvent, WebhookPayload};

use crate::dispatch::ReplyDirective;
use async_trait::async_trait;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Header LINE puts the body signature in.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Check `X-Line-Signature`: base64 of HMAC-SHA256 over the raw body,
/// keyed with the channel secret.
pub fn validate_signature(secret: &str, signature: &str, body: &[u8]) -> bool {
    let Some(expected) = sign(secret, body) else {
        return false;
    };
    expected.as_bytes().ct_eq(signature.trim().as_bytes()).into()
}

/// The signature LINE would send for `body`.
pub fn sign(secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

/// Delivers reply directives against a one-shot reply token.
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn reply(&self, reply_token: &str, messages: &[ReplyDirective]) -> anyhow::Result<()>;
}
