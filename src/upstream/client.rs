//! Content API Client
//!
//! Fetches JSON from the content API and fronts it with the response cache.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::ResponseCache;
use crate::error::{GatewayError, Result};

// == Request Key ==
/// Normalizes an endpoint path: leading slash, no trailing slash.
pub fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_matches('/');
    format!("/{}", trimmed)
}

/// Derives the cache key for a request from its endpoint and parameters.
///
/// Parameters are sorted so `?a=1&b=2` and `?b=2&a=1` share one entry.
pub fn request_key(endpoint: &str, params: &[(String, String)]) -> String {
    let path = normalize_endpoint(endpoint);
    if params.is_empty() {
        return path;
    }

    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort();
    let query = sorted
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", path, query)
}

// == Content Client ==
/// Plain HTTP client for the content API.
#[derive(Debug, Clone)]
pub struct ContentClient {
    http: reqwest::Client,
    base_url: String,
}

impl ContentClient {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// The content API is reached directly; environment proxy settings are
    /// ignored.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // == Fetch ==
    /// GETs `endpoint` with `params` and decodes the JSON body.
    ///
    /// Non-2xx answers become `GatewayError::UpstreamStatus`.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, normalize_endpoint(endpoint));
        let response = self.http.get(&url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::UpstreamStatus {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

// == Fetched ==
/// A value served by [`CachedContentClient`], tagged with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: T,
    pub cache_hit: bool,
}

// == Cached Content Client ==
/// Read-through client: answers from the cache when it can, otherwise
/// fetches upstream and stores successful responses.
///
/// Concurrent misses on the same key each go upstream; the last write wins.
#[derive(Debug, Clone)]
pub struct CachedContentClient {
    cache: Arc<RwLock<ResponseCache>>,
    upstream: ContentClient,
}

impl CachedContentClient {
    pub fn new(cache: Arc<RwLock<ResponseCache>>, upstream: ContentClient) -> Self {
        Self { cache, upstream }
    }

    // == Fetch ==
    /// Returns the response for `endpoint` + `params`, from cache if fresh.
    ///
    /// Upstream failures are returned as errors and never cached.
    pub async fn fetch<T>(&self, endpoint: &str, params: &[(String, String)]) -> Result<Fetched<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let key = request_key(endpoint, params);

        let cached = self.cache.write().await.get::<T>(&key);
        if let Some(value) = cached {
            debug!(key = %key, "Serving content from cache");
            return Ok(Fetched {
                value,
                cache_hit: true,
            });
        }

        let value = match self.upstream.fetch::<T>(endpoint, params).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Upstream fetch failed");
                return Err(e);
            }
        };

        self.cache.write().await.set(key.clone(), &value, None);
        debug!(key = %key, "Cached upstream response");

        Ok(Fetched {
            value,
            cache_hit: false,
        })
    }
}
