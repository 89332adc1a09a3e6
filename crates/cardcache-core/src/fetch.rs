//! Outbound network fetch capability.
//!
//! The manager never talks to the network directly; it goes through
//! [`NetworkFetch`] so tests can script responses and failures.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{header, Client};

use crate::error::FetchError;
use crate::http::{Request, Response};

/// HTTP request timeout in seconds.
/// 30s allows for slow asset hosts while failing fast enough offline.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[async_trait]
pub trait NetworkFetch: Send + Sync {
    /// Issue the request and capture the full response as a snapshot.
    /// Transport failures (offline, DNS, timeout) surface as errors;
    /// non-success statuses do not.
    async fn fetch(&self, request: &Request) -> Result<Response>;
}

/// Network fetcher backed by reqwest.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(FetchError::Network)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl NetworkFetch for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        let resp = self
            .client
            .request(request.method.clone(), request.url.as_str())
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = resp.status();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = resp.bytes().await.map_err(FetchError::Network)?;

        Ok(Response::new(status, content_type, body.to_vec()))
    }
}
