use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Generates a `Debug` impl that redacts secret fields.
///
/// Field specifiers:
/// - `field_name`            : printed normally via `&self.field_name`
/// - `redact(field_name)`    : `String` field: shows `[empty]` or `[REDACTED]`
macro_rules! redact_debug {
    // Internal: emit a single .field() call
    (@field $builder:ident, $self:ident, redact($field:ident)) => {
        $builder.field(
            stringify!($field),
            &if $self.$field.is_empty() {
                "[empty]"
            } else {
                "[REDACTED]"
            },
        );
    };
    (@field $builder:ident, $self:ident, $field:ident) => {
        $builder.field(stringify!($field), &$self.$field);
    };

    // Internal: recursive TT muncher
    (@fields $builder:ident, $self:ident,) => {};
    (@fields $builder:ident, $self:ident, redact($field:ident), $($rest:tt)*) => {
        redact_debug!(@field $builder, $self, redact($field));
        redact_debug!(@fields $builder, $self, $($rest)*);
    };
    (@fields $builder:ident, $self:ident, $field:ident, $($rest:tt)*) => {
        redact_debug!(@field $builder, $self, $field);
        redact_debug!(@fields $builder, $self, $($rest)*);
    };

    // Entry point
    ($struct_name:ident, $($fields:tt)*) => {
        impl std::fmt::Debug for $struct_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let mut builder = f.debug_struct(stringify!($struct_name));
                redact_debug!(@fields builder, self, $($fields)*);
                builder.finish()
            }
        }
    };
}

// Submodules, declared after the macro so they can use `redact_debug!`
mod line;
mod providers;
mod replies;

pub use line::*;
pub use providers::*;
pub use replies::*;

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog and conversation log
// ---------------------------------------------------------------------------

fn default_catalog_path() -> String {
    "mygo_db.json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON file with the `{name, url}` image entries.
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Conversation log file. Empty means `conversations.json` in the bot home.
    #[serde(default)]
    pub path: String,
}

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub line: LineConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub replies: RepliesConfig,
}

impl Config {
    pub fn catalog_path(&self) -> PathBuf {
        crate::utils::expand_home(&self.catalog.path)
    }

    pub fn store_path(&self) -> anyhow::Result<PathBuf> {
        if self.store.path.is_empty() {
            return Ok(crate::utils::get_bot_home()?.join("conversations.json"));
        }
        Ok(crate::utils::expand_home(&self.store.path))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), crate::errors::BotError> {
        self.validate_gateway()?;
        self.validate_catalog()?;
        self.validate_providers()?;
        self.replies.validate()?;
        Ok(())
    }

    /// Checks the settings `serve` cannot run without. Kept out of
    /// `validate` so offline commands (`search`, `ask`) work without them.
    pub fn require_line_credentials(&self) -> Result<(), crate::errors::BotError> {
        use crate::errors::BotError;

        if self.line.channel_access_token.is_empty() {
            return Err(BotError::Config(
                "line.channelAccessToken is required (or set CHANNEL_ACCESS_TOKEN)".into(),
            ));
        }
        if self.line.channel_secret.is_empty() {
            return Err(BotError::Config(
                "line.channelSecret is required (or set CHANNEL_SECRET)".into(),
            ));
        }
        Ok(())
    }

    fn validate_gateway(&self) -> Result<(), crate::errors::BotError> {
        use crate::errors::BotError;

        if self.gateway.port == 0 {
            return Err(BotError::Config("gateway.port must be > 0".into()));
        }
        if self.gateway.port < 1024 {
            warn!(
                "gateway.port {} is a privileged port (< 1024), may require elevated permissions",
                self.gateway.port
            );
        }
        if !self.line.webhook_path.starts_with('/') {
            return Err(BotError::Config(
                "line.webhookPath must start with '/'".into(),
            ));
        }
        let path = self.line.webhook_path.trim_end_matches('/');
        if path.is_empty() || path.starts_with("/conversations") || path.starts_with("/api/") {
            return Err(BotError::Config(format!(
                "line.webhookPath '{}' collides with a built-in route",
                self.line.webhook_path
            )));
        }
        if url::Url::parse(&self.line.api_base).is_err() {
            return Err(BotError::Config(format!(
                "line.apiBase is not a valid URL: {}",
                self.line.api_base
            )));
        }
        Ok(())
    }

    fn validate_catalog(&self) -> Result<(), crate::errors::BotError> {
        if self.catalog.path.trim().is_empty() {
            return Err(crate::errors::BotError::Config(
                "catalog.path must not be empty".into(),
            ));
        }
        Ok(())
    }

    fn validate_providers(&self) -> Result<(), crate::errors::BotError> {
        use crate::errors::BotError;
        let g = &self.providers.gemini;

        if g.max_tokens == 0 {
            return Err(BotError::Config(
                "providers.gemini.maxTokens must be > 0".into(),
            ));
        }
        if g.temperature.is_nan()
            || g.temperature.is_infinite()
            || g.temperature < 0.0
            || g.temperature > 2.0
        {
            return Err(BotError::Config(
                "providers.gemini.temperature must be a finite number between 0.0 and 2.0".into(),
            ));
        }
        if g.model.trim().is_empty() {
            return Err(BotError::Config(
                "providers.gemini.model must not be empty".into(),
            ));
        }
        if g.api_key.is_empty() {
            warn!("providers.gemini.apiKey is empty, free-form messages get the help text");
        }
        Ok(())
    }
}
