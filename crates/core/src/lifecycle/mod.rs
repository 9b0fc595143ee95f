//! Worker lifecycle controller.
//!
//! ```text
//! build ──► Manifest + AppShell
//!              │
//! host: install ──► stage shell into Staging          (install.rs)
//! host: activate ─► reconcile Content, drop Staging   (activate.rs)
//! host: fetch ────► passthrough | cache | network     (intercept.rs)
//! page: message ──► skipWaiting | downloadOffline     (message.rs)
//! ```
//!
//! Every handler is an async fn. The host keeps the corresponding lifecycle
//! event open until the returned future (or task handle) completes, which is
//! the only ordering guarantee the controller relies on.

pub mod activate;
pub mod install;
pub mod intercept;
pub mod message;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use futures_util::future::try_join_all;
use serde::Serialize;

use crate::Error;
use crate::host::HostRuntime;
use crate::key::Origin;
use crate::manifest::{AppShell, Manifest};
use crate::network::{CacheMode, FetchRequest, Fetcher};
use crate::store::{CacheStore, CachedResponse, MANIFEST_KEY, Region};

pub use activate::{ActivateKind, ActivateReport};
pub use intercept::{FetchOutcome, ResponseSource};
pub use message::ControlMessage;

/// The caching agent for one deployed manifest.
///
/// Cloning is cheap and clones share the injected store, network and host.
#[derive(Clone)]
pub struct Worker {
    manifest: Arc<Manifest>,
    shell: Arc<AppShell>,
    origin: Origin,
    store: Arc<dyn CacheStore>,
    network: Arc<dyn Fetcher>,
    host: Arc<dyn HostRuntime>,
}

/// Snapshot of the worker and its regions.
#[derive(Debug, Clone, Serialize, schemars::JsonSchema)]
pub struct WorkerStatus {
    pub origin: String,
    pub manifest_digest: String,
    /// Digest of the manifest recorded by the last completed activate.
    pub recorded_digest: Option<String>,
    pub resources: usize,
    pub shell: usize,
    pub staging_entries: usize,
    pub content_entries: usize,
}

impl Worker {
    pub fn new(
        manifest: Manifest, shell: AppShell, origin: Origin, store: Arc<dyn CacheStore>, network: Arc<dyn Fetcher>,
        host: Arc<dyn HostRuntime>,
    ) -> Self {
        Self { manifest: Arc::new(manifest), shell: Arc::new(shell), origin, store, network, host }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn shell(&self) -> &AppShell {
        &self.shell
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub async fn status(&self) -> Result<WorkerStatus, Error> {
        let recorded_digest = match self.store.get(Region::ManifestRecord, MANIFEST_KEY).await? {
            Some(record) => match Manifest::from_json(&record.body) {
                Ok(recorded) => Some(recorded.digest()),
                Err(e) => {
                    tracing::warn!(error = %e, "recorded manifest is unreadable");
                    None
                }
            },
            None => None,
        };

        Ok(WorkerStatus {
            origin: self.origin.to_string(),
            manifest_digest: self.manifest.digest(),
            recorded_digest,
            resources: self.manifest.len(),
            shell: self.shell.len(),
            staging_entries: self.store.keys(Region::Staging).await?.len(),
            content_entries: self.store.keys(Region::Content).await?.len(),
        })
    }

    /// Fetch every path concurrently, failing unless all responses are ok.
    ///
    /// Nothing is written here, so a failure leaves the store untouched.
    async fn fetch_all(&self, paths: &[String], cache: CacheMode) -> Result<Vec<(String, CachedResponse)>, Error> {
        let fetches = paths.iter().map(|path| async move {
            let request = FetchRequest { cache, ..FetchRequest::get(self.origin.url_for(path)) };
            let response = self.network.fetch(&request).await?;
            if !response.is_ok() {
                return Err(Error::HttpError(format!("{path}: status {}", response.status)));
            }
            Ok((path.clone(), response))
        });

        try_join_all(fetches).await
    }
}
