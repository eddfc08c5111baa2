use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Body of a webhook POST.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WebhookEvent {
    Message(MessageEvent),
    /// follow, unfollow, postback, join and the rest. Ignored.
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub struct MessageEvent {
    #[serde(default, rename = "replyToken")]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<EventSource>,
    /// Milliseconds since the epoch, as stamped by LINE.
    #[serde(default)]
    pub timestamp: Option<i64>,
    pub message: EventMessage,
}

impl MessageEvent {
    /// The message text, if this is a text message.
    pub fn text(&self) -> Option<&str> {
        match &self.message {
            EventMessage::Text { text } => Some(text),
            EventMessage::Other => None,
        }
    }

    /// When the user sent the message, if LINE supplied a usable timestamp.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.and_then(DateTime::from_timestamp_millis)
    }

    /// Conversation log key for this event's sender.
    pub fn conversation_key(&self) -> &str {
        self.source
            .as_ref()
            .and_then(EventSource::id)
            .unwrap_or("anonymous")
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventMessage {
    Text { text: String },
    /// Stickers, images, audio and so on.
    #[serde(other)]
    Other,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventSource {
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
    #[serde(default, rename = "groupId")]
    pub group_id: Option<String>,
    #[serde(default, rename = "roomId")]
    pub room_id: Option<String>,
}

impl EventSource {
    /// The user id when LINE provides one, else the group or room id.
    pub fn id(&self) -> Option<&str> {
        [&self.user_id, &self.group_id, &self.room_id]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|id| !id.is_empty())
    }
}
