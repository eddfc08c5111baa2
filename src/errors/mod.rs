use thiserror::Error;

/// Typed error hierarchy for mygo-bot.
///
/// Use at module boundaries (responder calls, config validation, webhook
/// verification). Leaf functions keep using `anyhow::Result`, and callers
/// downcast to `BotError` when they need the kind.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider error: {message}")]
    Provider { message: String, retryable: bool },

    #[error("Rate limit exceeded")]
    RateLimit { retry_after: Option<u64> },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid webhook signature")]
    Signature,
}

/// Convenience alias for results using `BotError`.
pub type BotResult<T> = std::result::Result<T, BotError>;

impl BotError {
    /// Whether the failure is transient. Nothing in the bot retries, but the
    /// flag is surfaced in logs so operators can tell outages from bad keys.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider { retryable, .. } => *retryable,
            Self::RateLimit { .. } => true,
            Self::Auth(_) | Self::Config(_) | Self::Signature => false,
        }
    }
}
