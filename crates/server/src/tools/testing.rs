//! Worker fixture for tool tests; no sockets involved.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shellkeep_core::{
    AppShell, CachedResponse, Error, FetchRequest, Fetcher, Manifest, MemoryStore, Origin, Worker, WorkerHost,
};

pub const ORIGIN: &str = "https://app.test";

/// Serves `<path>@v1` for every manifest path, 404 for anything else.
#[derive(Default)]
pub struct StaticNetwork {
    routes: Mutex<HashMap<String, CachedResponse>>,
    pub offline: Mutex<bool>,
    requests: Mutex<Vec<String>>,
}

impl StaticNetwork {
    /// URLs dispatched so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for StaticNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<CachedResponse, Error> {
        self.requests.lock().unwrap().push(request.url.clone());
        if *self.offline.lock().unwrap() {
            return Err(Error::Network(format!("offline: {}", request.url)));
        }
        Ok(self
            .routes
            .lock()
            .unwrap()
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| CachedResponse::new(404, "not found")))
    }
}

pub struct Harness {
    pub worker: Worker,
    pub host: Arc<WorkerHost>,
    pub network: Arc<StaticNetwork>,
}

pub fn harness() -> Harness {
    let manifest = Manifest::from_pairs([("index.html", "r1"), ("main.dart.js", "m1"), ("flutter.js", "f1")]).unwrap();
    let shell = AppShell::new(&manifest, ["index.html", "main.dart.js"]).unwrap();
    let origin = Origin::parse(ORIGIN).unwrap();

    let network = Arc::new(StaticNetwork::default());
    {
        let mut routes = network.routes.lock().unwrap();
        for path in manifest.paths() {
            routes.insert(origin.url_for(path), CachedResponse::new(200, format!("{path}@v1")));
        }
        routes.insert(format!("{ORIGIN}/api/devices"), CachedResponse::new(200, "[]"));
    }

    let host = Arc::new(WorkerHost::new());
    let worker = Worker::new(manifest, shell, origin, Arc::new(MemoryStore::new()), network.clone(), host.clone());

    Harness { worker, host, network }
}
