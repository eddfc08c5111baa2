//! Message classification: turns inbound text into a reply directive.

use crate::catalog::ImageCatalog;
use crate::config::{GeminiConfig, RepliesConfig};
use crate::errors::BotError;
use crate::providers::{ChatRequest, LLMProvider, Message};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// What to send back for one inbound message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReplyDirective {
    Text {
        text: String,
    },
    Sticker {
        package_id: String,
        sticker_id: String,
    },
    Image {
        url: String,
        preview_url: String,
    },
    Video {
        url: String,
        preview_url: String,
    },
    Location {
        title: String,
        address: String,
        latitude: f64,
        longitude: f64,
    },
}

impl ReplyDirective {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Sticker { .. } => "sticker",
            Self::Image { .. } => "image",
            Self::Video { .. } => "video",
            Self::Location { .. } => "location",
        }
    }

    /// Content logged as the assistant turn: the text itself for text
    /// replies, `placeholder` for everything else.
    pub fn transcript<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.as_text().unwrap_or(placeholder)
    }
}

/// Failure of the generative fallback.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{0:#}")]
    Responder(anyhow::Error),

    #[error("the model returned an empty reply")]
    EmptyResponse,
}

impl DispatchError {
    /// Whether the backend reported a transient failure (overload, rate limit).
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Responder(e) => e
                .downcast_ref::<BotError>()
                .is_some_and(BotError::is_retryable),
            Self::EmptyResponse => false,
        }
    }

    /// The reply users see when the generative call fails.
    pub fn into_directive(self, error_prefix: &str) -> ReplyDirective {
        ReplyDirective::text(format!("{}{}", error_prefix, self))
    }
}

/// Generation settings passed with every fallback prompt.
#[derive(Debug, Clone)]
pub struct ResponderSettings {
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system_prompt: Option<String>,
}

impl From<&GeminiConfig> for ResponderSettings {
    fn from(config: &GeminiConfig) -> Self {
        Self {
            model: Some(config.model.clone()),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            system_prompt: config.system_prompt.clone().filter(|s| !s.trim().is_empty()),
        }
    }
}

struct Responder {
    provider: Arc<dyn LLMProvider>,
    settings: ResponderSettings,
}

/// Model in use and the provider's counters since start-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponderStatus {
    pub model: String,
    pub requests: u64,
    pub tokens: u64,
    pub errors: u64,
}

/// Lower-cases after trimming; classification only ever sees this form.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub struct Dispatcher {
    catalog: Arc<ImageCatalog>,
    replies: RepliesConfig,
    responder: Option<Responder>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("catalog", &self.catalog)
            .field("replies", &self.replies)
            .field("responder", &self.responder.as_ref().map(|r| &r.settings))
            .finish()
    }
}

impl Dispatcher {
    pub fn new(catalog: Arc<ImageCatalog>, replies: RepliesConfig) -> Self {
        Self {
            catalog,
            replies,
            responder: None,
        }
    }

    /// Route free-form text to `provider` instead of answering with the help text.
    #[must_use]
    pub fn with_responder(
        mut self,
        provider: Arc<dyn LLMProvider>,
        settings: ResponderSettings,
    ) -> Self {
        self.responder = Some(Responder { provider, settings });
        self
    }

    /// `None` when free-form text gets the help text.
    pub fn responder_status(&self) -> Option<ResponderStatus> {
        let responder = self.responder.as_ref()?;
        let metrics = responder.provider.metrics();
        Some(ResponderStatus {
            model: responder
                .settings
                .model
                .clone()
                .unwrap_or_else(|| responder.provider.default_model().to_string()),
            requests: metrics.request_count,
            tokens: metrics.token_count,
            errors: metrics.error_count,
        })
    }

    pub fn replies(&self) -> &RepliesConfig {
        &self.replies
    }

    /// Classify `raw` and always produce a directive. A failed generative
    /// call becomes a text reply carrying the error description.
    pub async fn dispatch(&self, raw: &str) -> ReplyDirective {
        match self.try_dispatch(raw).await {
            Ok(directive) => directive,
            Err(e) => {
                warn!(
                    "generative fallback failed (retryable={}): {}",
                    e.is_retryable(),
                    e
                );
                e.into_directive(&self.replies.error_prefix)
            }
        }
    }

    /// Classify `raw`. Only the generative fallback can fail.
    pub async fn try_dispatch(&self, raw: &str) -> Result<ReplyDirective, DispatchError> {
        let text = normalize(raw);

        if let Some(directive) = self.canned(&text) {
            debug!("dispatch: canned {} reply", directive.kind());
            return Ok(directive);
        }

        if let Some(keyword) = self.search_keyword(&text) {
            return Ok(self.search_image(keyword));
        }

        let Some(responder) = self.responder.as_ref().filter(|_| !text.is_empty()) else {
            debug!("dispatch: help reply");
            return Ok(ReplyDirective::text(&self.replies.help));
        };

        debug!("dispatch: generative fallback, prompt_len={}", text.len());
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &responder.settings.system_prompt {
            messages.push(Message::system(system));
        }
        messages.push(Message::user(text));

        let response = responder
            .provider
            .chat(ChatRequest {
                messages,
                model: responder.settings.model.as_deref(),
                max_tokens: responder.settings.max_tokens,
                temperature: responder.settings.temperature,
            })
            .await
            .map_err(DispatchError::Responder)?;

        match response.content {
            Some(content) if !content.trim().is_empty() => {
                Ok(ReplyDirective::text(content.trim()))
            }
            _ => Err(DispatchError::EmptyResponse),
        }
    }

    fn canned(&self, text: &str) -> Option<ReplyDirective> {
        let r = &self.replies;
        if keyword_matches(&r.text.keyword, text) {
            Some(ReplyDirective::text(&r.text.text))
        } else if keyword_matches(&r.sticker.keyword, text) {
            Some(ReplyDirective::Sticker {
                package_id: r.sticker.package_id.clone(),
                sticker_id: r.sticker.sticker_id.clone(),
            })
        } else if keyword_matches(&r.image.keyword, text) {
            Some(ReplyDirective::Image {
                url: r.image.url.clone(),
                preview_url: r.image.preview_url.clone(),
            })
        } else if keyword_matches(&r.video.keyword, text) {
            Some(ReplyDirective::Video {
                url: r.video.url.clone(),
                preview_url: r.video.preview_url.clone(),
            })
        } else if keyword_matches(&r.location.keyword, text) {
            Some(ReplyDirective::Location {
                title: r.location.title.clone(),
                address: r.location.address.clone(),
                latitude: r.location.latitude,
                longitude: r.location.longitude,
            })
        } else {
            None
        }
    }

    /// The trimmed remainder after the search prefix, if `text` has it.
    fn search_keyword<'a>(&self, text: &'a str) -> Option<&'a str> {
        let prefix = normalize(&self.replies.image_search.prefix);
        text.strip_prefix(prefix.as_str()).map(str::trim)
    }

    fn search_image(&self, keyword: &str) -> ReplyDirective {
        match self.catalog.search(keyword) {
            Some(url) => {
                debug!("dispatch: catalog hit");
                ReplyDirective::Image {
                    url: url.to_string(),
                    preview_url: url.to_string(),
                }
            }
            None => {
                debug!("dispatch: catalog miss");
                ReplyDirective::text(&self.replies.image_search.not_found)
            }
        }
    }
}

fn keyword_matches(keyword: &str, text: &str) -> bool {
    normalize(keyword) == text
}
