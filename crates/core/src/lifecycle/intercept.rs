//! Fetch interception.
//!
//! ### Policy
//! - Non-GET requests, foreign-origin URLs and paths outside the manifest
//!   pass through to the host's default network handling.
//! - `/` (the entry document) is network-first with a cache fallback. Any
//!   response the network returns for it replaces the cached copy.
//! - Every other manifest path is cache-first; a miss is fetched and, when
//!   ok, written to Content before being returned.
//!
//! No retries and no timeouts: a failed fetch either falls back to the cache
//! (entry document) or propagates.

use super::Worker;
use crate::Error;
use crate::manifest::ROOT_PATH;
use crate::network::FetchRequest;
use crate::store::{CachedResponse, Region};

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
}

/// What the host should do with an intercepted request.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Not governed by the worker; the host fetches as if no worker existed.
    Passthrough,
    /// Respond with this response.
    Respond { response: CachedResponse, source: ResponseSource },
}

impl FetchOutcome {
    pub fn response(&self) -> Option<&CachedResponse> {
        match self {
            FetchOutcome::Passthrough => None,
            FetchOutcome::Respond { response, .. } => Some(response),
        }
    }

    pub fn source(&self) -> Option<ResponseSource> {
        match self {
            FetchOutcome::Passthrough => None,
            FetchOutcome::Respond { source, .. } => Some(*source),
        }
    }
}

impl Worker {
    /// Handle one intercepted request.
    ///
    /// # Errors
    ///
    /// Propagates network failures that have no cached fallback, and store
    /// read failures on the cache-first path.
    pub async fn fetch(&self, request: &FetchRequest) -> Result<FetchOutcome, Error> {
        if !request.is_read() {
            return Ok(FetchOutcome::Passthrough);
        }

        let Some(key) = self.origin.request_key(&request.url) else {
            return Ok(FetchOutcome::Passthrough);
        };

        if !self.manifest.contains(&key) {
            tracing::debug!(key = %key, "not in manifest, passing through");
            return Ok(FetchOutcome::Passthrough);
        }

        if key == ROOT_PATH { self.network_first(request, &key).await } else { self.cache_first(request, &key).await }
    }

    async fn cache_first(&self, request: &FetchRequest, key: &str) -> Result<FetchOutcome, Error> {
        if let Some(response) = self.store.get(Region::Content, key).await? {
            tracing::debug!(key, "cache hit");
            return Ok(FetchOutcome::Respond { response, source: ResponseSource::Cache });
        }

        tracing::debug!(key, "cache miss, fetching");
        let response = self.network.fetch(request).await?;
        if response.is_ok() {
            self.populate(key, &response).await;
        }

        Ok(FetchOutcome::Respond { response, source: ResponseSource::Network })
    }

    async fn network_first(&self, request: &FetchRequest, key: &str) -> Result<FetchOutcome, Error> {
        match self.network.fetch(request).await {
            Ok(response) => {
                self.populate(key, &response).await;
                Ok(FetchOutcome::Respond { response, source: ResponseSource::Network })
            }
            Err(network_err) => match self.store.get(Region::Content, key).await {
                Ok(Some(response)) => {
                    tracing::debug!(key, error = %network_err, "network failed, serving cached entry document");
                    Ok(FetchOutcome::Respond { response, source: ResponseSource::Cache })
                }
                Ok(None) => Err(network_err),
                Err(e) => {
                    tracing::warn!(key, error = %e, "cache fallback unavailable");
                    Err(network_err)
                }
            },
        }
    }

    /// Write-behind for a fetched response; a failed write only costs a future miss.
    async fn populate(&self, key: &str, response: &CachedResponse) {
        if let Err(e) = self.store.put(Region::Content, key, response).await {
            tracing::warn!(key, error = %e, "failed to populate content cache");
        }
    }
}
