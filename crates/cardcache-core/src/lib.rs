//! Offline asset cache for the phonetic flashcards app.
//!
//! Re-expresses the app's offline caching policy as a library: a versioned
//! named cache store, install-time caching of the application shell,
//! activation-time garbage collection of stale store versions plus a
//! best-effort warm-up pass, and a cache-first fetch interception policy
//! that synthesizes placeholder responses when the network is unavailable.
//!
//! The pieces the hosting environment normally provides are explicit seams
//! here: [`store::CacheStorage`] for the named request/response stores,
//! [`fetch::NetworkFetch`] for the outbound fetch capability, and
//! [`worker::Clients`] for tracking which manager version controls
//! interception. [`worker::OfflineCacheManager`] ties them together.

pub mod config;
pub mod error;
pub mod fetch;
pub mod http;
pub mod policy;
pub mod store;
pub mod worker;

pub use config::CacheConfig;
pub use error::FetchError;
pub use fetch::{HttpFetcher, NetworkFetch};
pub use http::{Request, Response};
pub use policy::{fallback_kind, fallback_response, is_runtime_cache_candidate, FallbackKind};
pub use store::{CacheStorage, CacheStore, DiskCaches, MemoryCaches};
pub use worker::{ActivateOutcome, Clients, FetchDecision, InstallOutcome, OfflineCacheManager};
