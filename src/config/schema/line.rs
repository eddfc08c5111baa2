use serde::{Deserialize, Serialize};

fn default_webhook_path() -> String {
    "/callback".to_string()
}

fn default_line_api_base() -> String {
    "https://api.line.me".to_string()
}

/// LINE Messaging API channel settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct LineConfig {
    #[serde(default, rename = "channelAccessToken")]
    pub channel_access_token: String,
    /// HMAC key for `X-Line-Signature`.
    #[serde(default, rename = "channelSecret")]
    pub channel_secret: String,
    #[serde(default = "default_webhook_path", rename = "webhookPath")]
    pub webhook_path: String,
    #[serde(default = "default_line_api_base", rename = "apiBase")]
    pub api_base: String,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_access_token: String::new(),
            channel_secret: String::new(),
            webhook_path: default_webhook_path(),
            api_base: default_line_api_base(),
        }
    }
}

redact_debug!(
    LineConfig,
    redact(channel_access_token),
    redact(channel_secret),
    webhook_path,
    api_base,
);
