//! Static image catalog with substring lookup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// One named image. The aliases accept the published MyGO dataset's keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEntry {
    #[serde(alias = "圖片名稱")]
    pub name: String,
    #[serde(alias = "圖片連結")]
    pub url: String,
}

/// Ordered, immutable list of images loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct ImageCatalog {
    entries: Vec<ImageEntry>,
}

impl ImageCatalog {
    /// Load the catalog from a JSON array of entries. A missing or malformed
    /// file is an error; the caller treats it as fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read image catalog {}", path.display()))?;
        let entries: Vec<ImageEntry> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse image catalog {}", path.display()))?;
        info!(
            "loaded {} image(s) from catalog {}",
            entries.len(),
            path.display()
        );
        Ok(Self { entries })
    }

    pub fn from_entries(entries: Vec<ImageEntry>) -> Self {
        Self { entries }
    }

    /// URL of the first entry, in load order, whose name contains `keyword`.
    ///
    /// Case-sensitive. An empty keyword matches the first entry.
    pub fn search(&self, keyword: &str) -> Option<&str> {
        let hit = self
            .entries
            .iter()
            .find(|entry| entry.name.contains(keyword));
        debug!(
            "catalog search keyword_len={} hit={}",
            keyword.len(),
            hit.is_some()
        );
        hit.map(|entry| entry.url.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
