//! Fakes shared by the lifecycle tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::Worker;
use crate::Error;
use crate::host::WorkerHost;
use crate::key::Origin;
use crate::manifest::{AppShell, Manifest};
use crate::network::{FetchRequest, Fetcher};
use crate::store::{CacheStore, CachedResponse, MemoryStore, Region};

pub const ORIGIN: &str = "https://app.test";

pub const RESOURCES: &[(&str, &str)] = &[
    ("index.html", "r1"),
    ("main.dart.js", "m1"),
    ("flutter.js", "f1"),
    ("assets/FontManifest.json", "fm1"),
];

pub const SHELL: &[&str] = &["main.dart.js", "index.html"];

pub fn url(path: &str) -> String {
    if path == "/" { format!("{ORIGIN}/") } else { format!("{ORIGIN}/{path}") }
}

/// Network fake serving a scripted table; unknown URLs get a 404.
///
/// Routes match on the URL without its query string.
#[derive(Default)]
pub struct ScriptedNetwork {
    routes: Mutex<HashMap<String, CachedResponse>>,
    unreachable: Mutex<HashSet<String>>,
    offline: Mutex<bool>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl ScriptedNetwork {
    pub fn serve(&self, path: &str, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(url(path), CachedResponse::new(200, body.to_string()));
    }

    pub fn serve_status(&self, path: &str, status: u16) {
        self.routes
            .lock()
            .unwrap()
            .insert(url(path), CachedResponse::new(status, "error page"));
    }

    pub fn unreachable(&self, path: &str) {
        self.unreachable.lock().unwrap().insert(url(path));
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }
}

#[async_trait]
impl Fetcher for ScriptedNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<CachedResponse, Error> {
        self.requests.lock().unwrap().push(request.clone());

        if *self.offline.lock().unwrap() || self.unreachable.lock().unwrap().contains(&request.url) {
            return Err(Error::Network(format!("unreachable: {}", request.url)));
        }

        let route = request.url.split('?').next().unwrap_or_default();
        Ok(self
            .routes
            .lock()
            .unwrap()
            .get(route)
            .cloned()
            .unwrap_or_else(|| CachedResponse::new(404, "not found")))
    }
}

/// Memory store that can be told to reject writes or deletes in one region.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_puts: Mutex<Option<Region>>,
    fail_deletes: Mutex<Option<Region>>,
}

impl FlakyStore {
    pub fn fail_puts_into(&self, region: Option<Region>) {
        *self.fail_puts.lock().unwrap() = region;
    }

    /// Reject single-entry deletes in `region`; region deletes still succeed.
    pub fn fail_deletes_into(&self, region: Option<Region>) {
        *self.fail_deletes.lock().unwrap() = region;
    }
}

#[async_trait]
impl CacheStore for FlakyStore {
    async fn open(&self, region: Region) -> Result<(), Error> {
        self.inner.open(region).await
    }

    async fn has_region(&self, region: Region) -> Result<bool, Error> {
        self.inner.has_region(region).await
    }

    async fn delete_region(&self, region: Region) -> Result<bool, Error> {
        self.inner.delete_region(region).await
    }

    async fn get(&self, region: Region, key: &str) -> Result<Option<CachedResponse>, Error> {
        self.inner.get(region, key).await
    }

    async fn put(&self, region: Region, key: &str, response: &CachedResponse) -> Result<(), Error> {
        if *self.fail_puts.lock().unwrap() == Some(region) {
            return Err(Error::Corrupt(format!("injected write failure for {key}")));
        }
        self.inner.put(region, key, response).await
    }

    async fn delete(&self, region: Region, key: &str) -> Result<bool, Error> {
        if *self.fail_deletes.lock().unwrap() == Some(region) {
            return Err(Error::Corrupt(format!("injected delete failure for {key}")));
        }
        self.inner.delete(region, key).await
    }

    async fn keys(&self, region: Region) -> Result<Vec<String>, Error> {
        self.inner.keys(region).await
    }
}

pub struct Fixture {
    pub worker: Worker,
    pub store: Arc<FlakyStore>,
    pub network: Arc<ScriptedNetwork>,
    pub host: Arc<WorkerHost>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with(RESOURCES, SHELL)
    }

    pub fn with(resources: &[(&str, &str)], shell: &[&str]) -> Self {
        let store = Arc::new(FlakyStore::default());
        let network = Arc::new(ScriptedNetwork::default());
        let host = Arc::new(WorkerHost::new());
        let worker = build_worker(resources, shell, store.clone(), network.clone(), host.clone());
        Self { worker, store, network, host }
    }

    /// A new worker version sharing this fixture's store, network and host.
    pub fn upgrade(&self, resources: &[(&str, &str)], shell: &[&str]) -> Worker {
        build_worker(resources, shell, self.store.clone(), self.network.clone(), self.host.clone())
    }

    pub async fn keys(&self, region: Region) -> Vec<String> {
        self.store.keys(region).await.unwrap()
    }

    pub async fn body(&self, region: Region, key: &str) -> Option<String> {
        self.store
            .get(region, key)
            .await
            .unwrap()
            .map(|r| String::from_utf8_lossy(&r.body).to_string())
    }
}

/// Body the network serves for a path at a given fingerprint.
pub fn body_for(path: &str, fingerprint: &str) -> String {
    format!("{path}@{fingerprint}")
}

fn build_worker(
    resources: &[(&str, &str)], shell: &[&str], store: Arc<FlakyStore>, network: Arc<ScriptedNetwork>,
    host: Arc<WorkerHost>,
) -> Worker {
    let manifest = Manifest::from_pairs(resources.iter().copied()).unwrap();
    let shell = AppShell::new(&manifest, shell.iter().copied()).unwrap();

    for path in manifest.paths() {
        let fingerprint = manifest.get(path).unwrap();
        network.serve(path, &body_for(path, fingerprint));
    }

    Worker::new(manifest, shell, Origin::parse(ORIGIN).unwrap(), store, network, host)
}
