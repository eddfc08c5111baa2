use crate::errors::BotError;
use crate::providers::base::ProviderMetrics;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::{error, warn};

/// Common error handling utilities for LLM providers.
///
/// Turns HTTP failures into typed `BotError`s so the dispatcher can show the
/// user something better than a status code.
pub struct ProviderErrorHandler;

impl ProviderErrorHandler {
    /// Parse API error response and return a typed error.
    ///
    /// Understands Google's `{"error": {"code", "message", "status"}}` body
    /// as well as the `{"error": {"type", "message"}}` shape.
    pub fn parse_api_error(status: u16, error_text: &str) -> Result<(), BotError> {
        let retryable = status == 500 || status == 502 || status == 503;

        if let Ok(error_json) = serde_json::from_str::<Value>(error_text)
            && let Some(err) = error_json.get("error")
        {
            let error_type = err
                .get("status")
                .or_else(|| err.get("type"))
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            let error_msg = err
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown error");

            if error_type == "NOT_FOUND" && error_msg.contains("models/") {
                return Err(BotError::Provider {
                    message: format!(
                        "Model not found: {}. Check providers.gemini.model in config.json.",
                        error_msg
                    ),
                    retryable: false,
                });
            }

            return Err(BotError::Provider {
                message: format!("API error ({}): {}", error_type, error_msg),
                retryable,
            });
        }

        Err(BotError::Provider {
            message: format!("API error ({}): {}", status, error_text),
            retryable,
        })
    }

    /// Log and handle provider errors consistently
    pub fn log_and_handle_error(e: &anyhow::Error, provider_name: &str, operation: &str) {
        error!(
            "{} provider error during {}: {}",
            provider_name, operation, e
        );
    }

    /// Handle rate limiting errors
    pub fn handle_rate_limit(status: u16, retry_after: Option<u64>) -> Result<(), BotError> {
        if let Some(seconds) = retry_after {
            warn!("Rate limit hit. Retry after {} seconds", seconds);
        } else {
            warn!("Rate limit hit (status: {})", status);
        }
        Err(BotError::RateLimit { retry_after })
    }

    /// Handle authentication errors
    pub fn handle_auth_error(status: u16, error_text: &str) -> Result<(), BotError> {
        warn!("Authentication error (status: {}): {}", status, error_text);
        Err(BotError::Auth(format!(
            "Authentication failed. Please check your API key. Error: {}",
            error_text
        )))
    }

    /// Check HTTP status and return a typed error if the response is not successful.
    /// On error, consumes the response body to extract error details.
    pub async fn check_http_status(
        resp: reqwest::Response,
        provider: &str,
    ) -> Result<reqwest::Response, anyhow::Error> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let retry_after = resp
            .headers()
            .get("retry-after")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        let error_text = resp
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());

        let err = if status == 429 {
            Self::log_and_handle_error(&anyhow::anyhow!("Rate limit exceeded"), provider, "chat");
            Self::handle_rate_limit(status.as_u16(), retry_after)
        } else if status == 401 || status == 403 {
            Self::log_and_handle_error(&anyhow::anyhow!("Authentication failed"), provider, "chat");
            Self::handle_auth_error(status.as_u16(), &error_text)
        } else {
            Self::log_and_handle_error(&anyhow::anyhow!("API error"), provider, "chat");
            Self::parse_api_error(status.as_u16(), &error_text)
        };

        match err {
            Err(e) => Err(e.into()),
            Ok(()) => Err(anyhow::anyhow!("{} returned HTTP {}", provider, status)),
        }
    }

    /// Check an HTTP response for errors (rate limit, auth, generic API errors).
    /// Returns the response body as JSON on success, or a typed error on failure.
    pub async fn check_response(
        resp: reqwest::Response,
        provider: &str,
        metrics: &Arc<Mutex<ProviderMetrics>>,
    ) -> Result<Value, anyhow::Error> {
        let resp = match Self::check_http_status(resp, provider).await {
            Ok(resp) => resp,
            Err(e) => {
                if let Ok(mut m) = metrics.lock() {
                    m.error_count += 1;
                }
                return Err(e);
            }
        };

        let json: Value = resp
            .json()
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "Failed to parse {} API response: {}",
                    provider,
                    e.without_url()
                )
            })?;

        // Check for API-level errors in the JSON body
        if let Some(error_val) = json.get("error") {
            if let Ok(mut m) = metrics.lock() {
                m.error_count += 1;
            }
            let error_text = serde_json::json!({ "error": error_val }).to_string();
            Self::log_and_handle_error(&anyhow::anyhow!("API error in response"), provider, "chat");
            if let Err(e) = Self::parse_api_error(200, &error_text) {
                return Err(e.into());
            }
        }

        Ok(json)
    }
}

#[cfg(test)]
mod tests;
