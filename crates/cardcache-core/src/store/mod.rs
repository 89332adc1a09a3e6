//! Named cache stores.
//!
//! A [`CacheStorage`] owns a family of named request/response stores, one
//! per version tag. Stores are opened by name (creating on first open),
//! enumerated, and deleted wholesale when a newer version garbage-collects
//! its predecessors. Individual entries are keyed by absolute request URL;
//! there is no expiry and no revalidation - an entry lives until its whole
//! store is deleted.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::http::{Request, Response};

pub mod disk;
pub mod memory;

pub use disk::DiskCaches;
pub use memory::MemoryCaches;

/// One named store of request/response snapshots.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up the stored snapshot for a request, if any.
    async fn match_request(&self, request: &Request) -> Result<Option<Response>>;

    /// Store a snapshot keyed by the request URL, replacing any previous one.
    async fn put(&self, request: &Request, response: Response) -> Result<()>;
}

/// A family of named cache stores.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open the store with the given name, creating it if absent.
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheStore>>;

    /// Names of all stores currently known.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Delete a whole store. Returns whether anything was deleted.
    async fn delete(&self, name: &str) -> Result<bool>;
}
