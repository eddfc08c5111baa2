use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// RFC 3339 in UTC with a `Z` suffix, the form every stored timestamp uses.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// One logged turn. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// RFC 3339 timestamp of when the turn happened.
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub messages: Vec<Message>,
    /// Kept as stored so a load-save cycle never rewrites it.
    pub created_at: String,
}

impl ConversationRecord {
    fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            messages: Vec::new(),
            created_at: format_timestamp(created_at),
        }
    }
}

/// Every user's transcript, keyed by platform user id, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationLog(IndexMap<String, ConversationRecord>);

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn stamped with the current time.
    pub fn append_turn(&mut self, user_id: &str, role: Role, content: impl Into<String>) {
        self.append_turn_at(user_id, role, content, Utc::now());
    }

    /// Append a turn that happened at `at`. A user seen for the first time
    /// gets a record whose `created_at` is `at`; existing records keep theirs.
    pub fn append_turn_at(
        &mut self,
        user_id: &str,
        role: Role,
        content: impl Into<String>,
        at: DateTime<Utc>,
    ) {
        let record = self
            .0
            .entry(user_id.to_string())
            .or_insert_with(|| ConversationRecord::new(at));
        record.messages.push(Message {
            role,
            content: content.into(),
            timestamp: format_timestamp(at),
        });
    }

    pub fn get(&self, user_id: &str) -> Option<&ConversationRecord> {
        self.0.get(user_id)
    }

    /// Remove one user's record. Returns whether it existed.
    pub fn remove(&mut self, user_id: &str) -> bool {
        self.0.shift_remove(user_id).is_some()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConversationRecord)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
