//! Static documentation content
//!
//! The bot's answers come from a single JSON file: a map of named pages
//! (title, content, links) plus named link categories. [`DocCache`] keeps
//! the parsed library in memory and re-reads the file once its TTL
//! elapses, checked lazily on access.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// One documentation page
#[derive(Debug, Clone, Deserialize)]
pub struct DocPage {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub links: BTreeMap<String, String>,
}

/// A named group of links
#[derive(Debug, Clone, Deserialize)]
pub struct DocCategory {
    #[serde(default)]
    pub links: BTreeMap<String, String>,
}

/// The full parsed documentation file
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DocLibrary {
    #[serde(default)]
    pub docs: BTreeMap<String, DocPage>,
    #[serde(default)]
    pub categories: BTreeMap<String, DocCategory>,
}

impl DocLibrary {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read documentation file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse documentation file {}", path.display()))
    }

    pub fn page(&self, key: &str) -> Option<&DocPage> {
        self.docs.get(key)
    }

    pub fn category(&self, key: &str) -> Option<&DocCategory> {
        self.categories.get(key)
    }
}

/// TTL cache over the documentation library
///
/// Expiry is checked on access. A failed re-read keeps serving the last
/// good copy; a stale answer beats no answer.
#[derive(Debug)]
pub struct DocCache {
    path: PathBuf,
    ttl: Duration,
    library: DocLibrary,
    loaded_at: Instant,
}

impl DocCache {
    /// Load the documentation file and start the TTL clock
    pub fn load(path: impl Into<PathBuf>, ttl: Duration) -> Result<Self> {
        let path = path.into();
        let library = DocLibrary::load(&path)?;
        Ok(Self {
            path,
            ttl,
            library,
            loaded_at: Instant::now(),
        })
    }

    pub fn needs_refresh(&self) -> bool {
        self.loaded_at.elapsed() >= self.ttl
    }

    /// Re-read the file unconditionally
    pub fn refresh(&mut self) -> Result<()> {
        self.library = DocLibrary::load(&self.path)?;
        self.loaded_at = Instant::now();
        Ok(())
    }

    /// The current library, refreshing first if the TTL has elapsed
    pub fn library(&mut self) -> &DocLibrary {
        if self.needs_refresh() {
            if let Err(error) = self.refresh() {
                tracing::warn!(%error, "documentation refresh failed, serving cached copy");
                // Push the next attempt a full TTL out
                self.loaded_at = Instant::now();
            }
        }
        &self.library
    }

    /// Build a cache around an already-parsed library (tests)
    #[cfg(test)]
    pub fn from_library(library: DocLibrary, ttl: Duration) -> Self {
        Self {
            path: PathBuf::new(),
            ttl,
            library,
            loaded_at: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "docs": {
            "home": {
                "title": "Home",
                "content": "Main resources",
                "links": {"Website": "https://docs.example.com"}
            }
        },
        "categories": {
            "main": {
                "links": {"Getting Started": "https://docs.example.com/start"}
            }
        }
    }"#;

    #[test]
    fn test_library_parsing() {
        let library: DocLibrary = serde_json::from_str(SAMPLE).unwrap();
        let page = library.page("home").unwrap();
        assert_eq!(page.title, "Home");
        assert_eq!(
            page.links.get("Website").map(String::as_str),
            Some("https://docs.example.com")
        );
        assert!(library.category("main").is_some());
        assert!(library.page("missing").is_none());
    }

    #[test]
    fn test_missing_sections_default_empty() {
        let library: DocLibrary = serde_json::from_str("{}").unwrap();
        assert!(library.docs.is_empty());
        assert!(library.categories.is_empty());
    }

    #[test]
    fn test_cache_ttl() {
        let library: DocLibrary = serde_json::from_str(SAMPLE).unwrap();
        let cache = DocCache::from_library(library, Duration::from_secs(300));
        assert!(!cache.needs_refresh());

        let library: DocLibrary = serde_json::from_str(SAMPLE).unwrap();
        let cache = DocCache::from_library(library, Duration::ZERO);
        assert!(cache.needs_refresh());
    }

    #[test]
    fn test_cache_load_from_disk() {
        let path = std::env::temp_dir().join("docbot-test-docs.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let mut cache = DocCache::load(&path, Duration::from_secs(300)).unwrap();
        assert!(cache.library().page("home").is_some());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_cache_load_missing_file() {
        let path = std::env::temp_dir().join("docbot-test-missing.json");
        assert!(DocCache::load(&path, Duration::from_secs(300)).is_err());
    }
}
