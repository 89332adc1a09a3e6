//! Request and response snapshot types.
//!
//! A [`Response`] is a snapshot of what came back from the network: status,
//! content type, and the full body bytes. Snapshots are cheap to clone and
//! serializable, so the same value can be handed to the caller and persisted
//! into a cache store without consuming either copy.

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

/// An intercepted (or internally issued) retrieval request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: String,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }
}

/// A response snapshot. Status is stored as the raw code so snapshots
/// serialize cleanly into cache store entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    status: u16,
    content_type: Option<String>,
    body: Vec<u8>,
}

impl Response {
    pub fn new(status: StatusCode, content_type: Option<String>, body: Vec<u8>) -> Self {
        Self {
            status: status.as_u16(),
            content_type,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as text, for diagnostics and plain-text fallback bodies.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Resolve an asset path from the configured lists against the controlling
/// origin. Paths are written relative (`./index.html`); absolute URLs pass
/// through untouched.
pub fn resolve_url(origin: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let origin = origin.trim_end_matches('/');
    let path = path.trim_start_matches('.');
    if path.starts_with('/') {
        format!("{}{}", origin, path)
    } else {
        format!("{}/{}", origin, path)
    }
}

// ============================================================================
// Tests
// ============================================================================
