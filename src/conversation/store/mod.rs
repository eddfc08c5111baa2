use super::log::ConversationLog;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Trait for conversation log storage backends.
///
/// The whole log is read and written at once. Callers that mutate it should
/// go through [`update`] so cycles in one process do not overwrite each other.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Read the full log. No persisted state yet is an empty log, not an error.
    async fn load(&self) -> Result<ConversationLog>;

    /// Replace the persisted log with `log`.
    async fn save(&self, log: &ConversationLog) -> Result<()>;

    /// Guard held for the duration of one load-mutate-save cycle.
    async fn lock(&self) -> MutexGuard<'_, ()>;
}

/// Run one serialized load-mutate-save cycle and return the closure's result.
pub async fn update<S, F, R>(store: &S, mutate: F) -> Result<R>
where
    S: ConversationStore + ?Sized,
    F: FnOnce(&mut ConversationLog) -> R + Send,
    R: Send,
{
    let _guard = store.lock().await;
    let mut log = store.load().await?;
    let result = mutate(&mut log);
    store.save(&log).await?;
    Ok(result)
}

/// Conversation log kept in one pretty-printed JSON file.
///
/// Only same-process writers are serialized. Two processes sharing the file
/// still race, and the last `save` wins.
pub struct JsonFileStore {
    path: PathBuf,
    cycle: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cycle: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConversationStore for JsonFileStore {
    async fn load(&self) -> Result<ConversationLog> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no conversation log at {}", self.path.display());
                return Ok(ConversationLog::new());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read conversation log {}", self.path.display())
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(ConversationLog::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse conversation log {}", self.path.display()))
    }

    async fn save(&self, log: &ConversationLog) -> Result<()> {
        let content = serde_json::to_string_pretty(log)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || crate::utils::atomic_write(&path, &content))
            .await
            .context("conversation log writer task failed")??;
        debug!(
            "saved {} conversation(s) to {}",
            log.len(),
            self.path.display()
        );
        Ok(())
    }

    async fn lock(&self) -> MutexGuard<'_, ()> {
        self.cycle.lock().await
    }
}
