//! Disk-backed cache storage.
//!
//! Each named store is a directory under the root; each entry is a JSON
//! file named by the SHA-256 of its URL, holding the URL, the response
//! snapshot, and when it was stored. The timestamp is diagnostic only -
//! entries are never expired, only garbage-collected with their store.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::{CacheStorage, CacheStore};
use crate::http::{Request, Response};

/// Directory name under the platform cache dir.
const APP_DIR: &str = "cardcache";

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    url: String,
    cached_at: DateTime<Utc>,
    response: Response,
}

pub struct DiskCaches {
    root: PathBuf,
}

impl DiskCaches {
    pub fn new(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create cache root: {}", root.display()))?;
        Ok(Self { root })
    }

    /// Root the storage under the platform cache directory.
    pub fn open_default() -> Result<Self> {
        let cache_dir =
            dirs::cache_dir().ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Self::new(cache_dir.join(APP_DIR))
    }

    fn store_path(&self, name: &str) -> PathBuf {
        self.root.join(sanitize(name))
    }
}

/// Store names become directory names; anything unsafe is replaced.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn entry_file(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    format!("{}.json", hex::encode(digest))
}

#[async_trait]
impl CacheStorage for DiskCaches {
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheStore>> {
        let path = self.store_path(name);
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create cache store: {}", name))?;
        Ok(Arc::new(DiskStore { path }))
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root).context("Failed to read cache root")? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let path = self.store_path(name);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&path)
            .with_context(|| format!("Failed to delete cache store: {}", name))?;
        Ok(true)
    }
}

pub struct DiskStore {
    path: PathBuf,
}

#[async_trait]
impl CacheStore for DiskStore {
    async fn match_request(&self, request: &Request) -> Result<Option<Response>> {
        let path = self.path.join(entry_file(&request.url));
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache entry for {}", request.url))?;
        let entry: StoredEntry = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache entry for {}", request.url))?;

        debug!(url = %request.url, cached_at = %entry.cached_at, "disk cache hit");
        Ok(Some(entry.response))
    }

    async fn put(&self, request: &Request, response: Response) -> Result<()> {
        let entry = StoredEntry {
            url: request.url.clone(),
            cached_at: Utc::now(),
            response,
        };
        let contents = serde_json::to_string(&entry)?;
        fs::write(self.path.join(entry_file(&request.url)), contents)
            .with_context(|| format!("Failed to write cache entry for {}", request.url))?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn snapshot(body: &str) -> Response {
        Response::new(
            StatusCode::OK,
            Some("text/html".to_string()),
            body.as_bytes().to_vec(),
        )
    }

    #[tokio::test]
    async fn test_entries_survive_reopening_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::get("https://cards.test/index.html");

        {
            let caches = DiskCaches::new(dir.path().to_path_buf()).unwrap();
            let store = caches.open("phonetic-cards-v2.0").await.unwrap();
            store.put(&request, snapshot("<html>")).await.unwrap();
        }

        let caches = DiskCaches::new(dir.path().to_path_buf()).unwrap();
        let store = caches.open("phonetic-cards-v2.0").await.unwrap();
        let hit = store.match_request(&request).await.unwrap().unwrap();
        assert_eq!(hit.body_text(), "<html>");
        assert_eq!(hit.status(), StatusCode::OK);
        assert_eq!(hit.content_type(), Some("text/html"));
    }

    #[tokio::test]
    async fn test_keys_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let caches = DiskCaches::new(dir.path().to_path_buf()).unwrap();

        caches.open("phonetic-cards-v1.0").await.unwrap();
        caches.open("phonetic-cards-v2.0").await.unwrap();

        let mut names = caches.keys().await.unwrap();
        names.sort();
        assert_eq!(
            names,
            vec![
                "phonetic-cards-v1.0".to_string(),
                "phonetic-cards-v2.0".to_string()
            ]
        );

        assert!(caches.delete("phonetic-cards-v1.0").await.unwrap());
        assert!(!caches.delete("phonetic-cards-v1.0").await.unwrap());
        assert_eq!(
            caches.keys().await.unwrap(),
            vec!["phonetic-cards-v2.0".to_string()]
        );
    }

    #[tokio::test]
    async fn test_match_misses_on_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let caches = DiskCaches::new(dir.path().to_path_buf()).unwrap();
        let store = caches.open("phonetic-cards-v2.0").await.unwrap();

        let miss = store
            .match_request(&Request::get("https://cards.test/audio/ant.mp3"))
            .await
            .unwrap();
        assert!(miss.is_none());
    }
}
