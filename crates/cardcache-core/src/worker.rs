//! Offline cache manager: lifecycle handling and fetch interception.
//!
//! The manager owns the three lifecycle steps the host raises - install,
//! activate, fetch - plus the post-activation warm-up pass. Every fallible
//! branch is caught locally: lifecycle steps report outcomes instead of
//! failing, and the fetch handler always produces either a passthrough
//! decision or a concrete response.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::join_all;
use reqwest::{Method, StatusCode};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::config::CacheConfig;
use crate::error::FetchError;
use crate::fetch::NetworkFetch;
use crate::http::{resolve_url, Request, Response};
use crate::policy::{fallback_response, is_runtime_cache_candidate};
use crate::store::{CacheStorage, CacheStore};

/// Stand-in for the host's client registry: records which manager version
/// currently controls fetch interception for the open pages.
#[derive(Default)]
pub struct Clients {
    controller: RwLock<Option<String>>,
}

impl Clients {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take control of all open clients without waiting for a reload.
    pub async fn claim(&self, version: &str) {
        let mut controller = self.controller.write().await;
        *controller = Some(version.to_string());
    }

    pub async fn controller(&self) -> Option<String> {
        self.controller.read().await.clone()
    }
}

/// Outcome of the install step. Install never fails outright; a failed
/// shell batch is logged and swallowed so installation still completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallOutcome {
    /// Whether the application shell made it into the store.
    pub shell_cached: bool,
    /// Whether the host should skip the wait state and activate immediately.
    /// Only signalled when the shell batch succeeded.
    pub skip_waiting: bool,
}

/// Outcome of the activate step.
#[derive(Debug, Clone, Default)]
pub struct ActivateOutcome {
    /// Stale store names that were successfully garbage-collected.
    pub deleted_stores: Vec<String>,
    /// Warm-up entries added.
    pub warmed: usize,
    /// Warm-up entries that failed and were skipped.
    pub warmup_failures: usize,
}

/// What the fetch handler decided for an intercepted request.
#[derive(Debug)]
pub enum FetchDecision {
    /// The handler declines to intervene; the request proceeds as if
    /// unintercepted. Cross-origin and non-GET requests land here.
    Passthrough,
    /// The handler produced a response: cached, fetched, or synthesized.
    Respond(Response),
}

pub struct OfflineCacheManager {
    config: CacheConfig,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn NetworkFetch>,
    clients: Arc<Clients>,
}

impl OfflineCacheManager {
    pub fn new(
        config: CacheConfig,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn NetworkFetch>,
    ) -> Self {
        Self {
            config,
            storage,
            fetcher,
            clients: Arc::new(Clients::new()),
        }
    }

    /// Share a client registry with the embedding host.
    pub fn with_clients(mut self, clients: Arc<Clients>) -> Self {
        self.clients = clients;
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn clients(&self) -> Arc<Clients> {
        Arc::clone(&self.clients)
    }

    // ===== Lifecycle: install =====

    /// Install: open the versioned store and cache the application shell
    /// all-or-nothing. Shell failure is diagnostic only - it is logged with
    /// the full intended static list and swallowed, and skip-waiting is not
    /// signalled.
    pub async fn install(&self) -> InstallOutcome {
        info!(version = %self.config.app_version, "installing offline cache manager");

        match self.install_shell().await {
            Ok(()) => {
                info!(cache = %self.config.cache_name, "shell assets cached");
                InstallOutcome {
                    shell_cached: true,
                    skip_waiting: true,
                }
            }
            Err(e) => {
                error!(
                    error = %e,
                    attempted = ?self.config.static_assets,
                    "failed to cache shell assets"
                );
                InstallOutcome {
                    shell_cached: false,
                    skip_waiting: false,
                }
            }
        }
    }

    async fn install_shell(&self) -> Result<()> {
        let store = self.storage.open(&self.config.cache_name).await?;
        self.add_all(store.as_ref(), &self.config.shell_assets).await
    }

    // ===== Lifecycle: activate =====

    /// Activate: garbage-collect every differently-named store and claim the
    /// open clients, then run the best-effort warm-up pass. Warm-up starts
    /// only after both earlier steps have settled.
    pub async fn activate(&self) -> ActivateOutcome {
        info!(version = %self.config.app_version, "activating offline cache manager");

        let (deleted_stores, _) = tokio::join!(
            self.delete_stale_stores(),
            self.clients.claim(&self.config.app_version)
        );
        info!(deleted = deleted_stores.len(), "offline cache manager activated");

        let (warmed, warmup_failures) = self.warm_up().await;

        ActivateOutcome {
            deleted_stores,
            warmed,
            warmup_failures,
        }
    }

    /// Delete all stores whose name differs from the current version tag.
    /// Deletions run concurrently; outcomes are aggregated, never
    /// short-circuited.
    async fn delete_stale_stores(&self) -> Vec<String> {
        let names = match self.storage.keys().await {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "failed to enumerate cache stores");
                return Vec::new();
            }
        };

        let stale: Vec<String> = names
            .into_iter()
            .filter(|name| *name != self.config.cache_name)
            .collect();

        let outcomes = join_all(stale.iter().map(|name| async move {
            match self.storage.delete(name).await {
                Ok(_) => {
                    info!(cache = %name, "deleted stale cache store");
                    true
                }
                Err(e) => {
                    warn!(cache = %name, error = %e, "failed to delete stale cache store");
                    false
                }
            }
        }))
        .await;

        stale
            .into_iter()
            .zip(outcomes)
            .filter_map(|(name, deleted)| deleted.then_some(name))
            .collect()
    }

    /// Sequentially add each warm-up asset; every failure is logged and
    /// skipped so siblings still get their chance.
    async fn warm_up(&self) -> (usize, usize) {
        let store = match self.storage.open(&self.config.cache_name).await {
            Ok(store) => store,
            Err(e) => {
                warn!(error = %e, "failed to open cache store for warm-up");
                return (0, self.config.warmup_assets.len());
            }
        };

        let mut warmed = 0;
        let mut failures = 0;
        for asset in &self.config.warmup_assets {
            match self.cache_add(store.as_ref(), asset).await {
                Ok(()) => {
                    info!(asset = %asset, "warmed cache entry");
                    warmed += 1;
                }
                Err(e) => {
                    warn!(asset = %asset, error = %e, "failed to warm cache entry");
                    failures += 1;
                }
            }
        }
        (warmed, failures)
    }

    // ===== Fetch interception =====

    /// Fetch interception policy: cache-first with opportunistic population.
    /// Cross-origin and non-GET requests are never intercepted.
    pub async fn handle_fetch(&self, request: &Request) -> FetchDecision {
        if !request.url.starts_with(&self.config.origin) {
            return FetchDecision::Passthrough;
        }
        if request.method != Method::GET {
            return FetchDecision::Passthrough;
        }

        FetchDecision::Respond(self.respond(request).await)
    }

    async fn respond(&self, request: &Request) -> Response {
        if let Some(cached) = self.lookup(request).await {
            debug!(url = %request.url, "served from cache");
            return cached;
        }
        self.fetch_and_maybe_cache(request).await
    }

    /// Cache lookup; store errors degrade to a miss.
    async fn lookup(&self, request: &Request) -> Option<Response> {
        let store = match self.storage.open(&self.config.cache_name).await {
            Ok(store) => store,
            Err(e) => {
                warn!(error = %e, "failed to open cache store for lookup");
                return None;
            }
        };
        match store.match_request(request).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(url = %request.url, error = %e, "cache lookup failed");
                None
            }
        }
    }

    async fn fetch_and_maybe_cache(&self, request: &Request) -> Response {
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                // Only persist plain 200s for candidate URLs; delivery is
                // never blocked on the write.
                if response.status() == StatusCode::OK
                    && is_runtime_cache_candidate(&request.url)
                {
                    self.spawn_cache_write(request.clone(), response.clone());
                }
                response
            }
            Err(e) => {
                debug!(url = %request.url, error = %e, "network request failed, synthesizing fallback");
                fallback_response(&request.url)
            }
        }
    }

    fn spawn_cache_write(&self, request: Request, response: Response) {
        let storage = Arc::clone(&self.storage);
        let cache_name = self.config.cache_name.clone();

        tokio::spawn(async move {
            let store = match storage.open(&cache_name).await {
                Ok(store) => store,
                Err(e) => {
                    warn!(error = %e, "failed to open cache store for runtime caching");
                    return;
                }
            };
            match store.put(&request, response).await {
                Ok(()) => debug!(url = %request.url, "cached runtime response"),
                Err(e) => {
                    warn!(url = %request.url, error = %e, "failed to cache runtime response")
                }
            }
        });
    }

    // ===== Store population helpers =====

    /// Fetch one asset and store the snapshot; the host's `cache.add`.
    async fn cache_add(&self, store: &dyn CacheStore, asset: &str) -> Result<()> {
        let request = Request::get(resolve_url(&self.config.origin, asset));
        let response = self.fetch_ok(&request).await?;
        store
            .put(&request, response)
            .await
            .with_context(|| format!("Failed to store cache entry: {}", asset))
    }

    /// Batch add with all-or-nothing semantics: every asset must fetch
    /// successfully before anything is stored.
    async fn add_all(&self, store: &dyn CacheStore, assets: &[String]) -> Result<()> {
        let mut fetched = Vec::with_capacity(assets.len());
        for asset in assets {
            let request = Request::get(resolve_url(&self.config.origin, asset));
            let response = self
                .fetch_ok(&request)
                .await
                .with_context(|| format!("Failed to fetch asset: {}", asset))?;
            fetched.push((request, response));
        }

        for (request, response) in fetched {
            store
                .put(&request, response)
                .await
                .with_context(|| format!("Failed to store cache entry: {}", request.url))?;
        }
        Ok(())
    }

    /// Fetch requiring a plain 200; anything else fails the add.
    async fn fetch_ok(&self, request: &Request) -> Result<Response> {
        let response = self.fetcher.fetch(request).await?;
        if response.status() != StatusCode::OK {
            return Err(FetchError::UnexpectedStatus {
                url: request.url.clone(),
                status: response.status().as_u16(),
            }
            .into());
        }
        Ok(response)
    }
}

// ============================================================================
// Tests
// ============================================================================
