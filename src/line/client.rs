use super::ReplySender;
use crate::dispatch::ReplyDirective;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, warn};

/// LINE accepts at most five messages per reply call.
const MAX_REPLY_MESSAGES: usize = 5;

/// Convert a directive to the LINE message object it is sent as.
pub fn to_line_message(directive: &ReplyDirective) -> Value {
    match directive {
        ReplyDirective::Text { text } => json!({"type": "text", "text": text}),
        ReplyDirective::Sticker {
            package_id,
            sticker_id,
        } => json!({
            "type": "sticker",
            "packageId": package_id,
            "stickerId": sticker_id,
        }),
        ReplyDirective::Image { url, preview_url } => json!({
            "type": "image",
            "originalContentUrl": url,
            "previewImageUrl": preview_url,
        }),
        ReplyDirective::Video { url, preview_url } => json!({
            "type": "video",
            "originalContentUrl": url,
            "previewImageUrl": preview_url,
        }),
        ReplyDirective::Location {
            title,
            address,
            latitude,
            longitude,
        } => json!({
            "type": "location",
            "title": title,
            "address": address,
            "latitude": latitude,
            "longitude": longitude,
        }),
    }
}

/// Reply API client authenticated with the channel access token.
pub struct LineClient {
    access_token: String,
    api_base: String,
    client: reqwest::Client,
}

impl LineClient {
    pub fn new(access_token: impl Into<String>, api_base: &str) -> Self {
        Self {
            access_token: access_token.into(),
            api_base: api_base.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }
}

#[async_trait]
impl ReplySender for LineClient {
    async fn reply(&self, reply_token: &str, messages: &[ReplyDirective]) -> Result<()> {
        if messages.len() > MAX_REPLY_MESSAGES {
            warn!(
                "line: {} messages exceed the reply limit, sending the first {}",
                messages.len(),
                MAX_REPLY_MESSAGES
            );
        }
        let payload = json!({
            "replyToken": reply_token,
            "messages": messages
                .iter()
                .take(MAX_REPLY_MESSAGES)
                .map(to_line_message)
                .collect::<Vec<_>>(),
        });

        let url = format!("{}/v2/bot/message/reply", self.api_base);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await
            .context("Failed to send LINE reply")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
                .unwrap_or(body);
            return Err(anyhow::anyhow!(
                "LINE API error ({}): {}",
                status.as_u16(),
                message
            ));
        }

        debug!("line: reply sent, messages={}", messages.len());
        Ok(())
    }
}
