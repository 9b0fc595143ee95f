//! Fingerprint manifest and application shell.
//!
//! A [`Manifest`] maps every cacheable logical path to the content
//! fingerprint produced at build time. It is the universe of resources the
//! worker governs and, as a whole, the identity of one deployed version.
//!
//! ### Invariants
//! - Paths are unique (ordered map).
//! - The root path `/` is always present and aliases the entry document.
//! - Neither paths nor fingerprints are empty.

pub mod deployment;
pub mod digest;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Error;

pub use deployment::Deployment;

/// Logical path of the entry document alias.
pub const ROOT_PATH: &str = "/";

/// Path the root alias is derived from when the build omits it.
pub const ENTRY_DOCUMENT: &str = "index.html";

/// Immutable path → fingerprint mapping for one deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    resources: BTreeMap<String, String>,
}

impl Manifest {
    /// Build a manifest, aliasing `/` to `index.html` when the build left it out.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidManifest` if a path or fingerprint is empty, or if
    /// no root entry exists after aliasing.
    pub fn new(mut resources: BTreeMap<String, String>) -> Result<Self, Error> {
        if !resources.contains_key(ROOT_PATH)
            && let Some(fingerprint) = resources.get(ENTRY_DOCUMENT).cloned()
        {
            resources.insert(ROOT_PATH.to_string(), fingerprint);
        }

        for (path, fingerprint) in &resources {
            if path.is_empty() {
                return Err(Error::InvalidManifest("empty resource path".into()));
            }
            if fingerprint.is_empty() {
                return Err(Error::InvalidManifest(format!("empty fingerprint for {path}")));
            }
        }

        if !resources.contains_key(ROOT_PATH) {
            return Err(Error::InvalidManifest(format!(
                "no {ROOT_PATH} entry and no {ENTRY_DOCUMENT} to alias it from"
            )));
        }

        Ok(Self { resources })
    }

    /// Build a manifest from `(path, fingerprint)` pairs.
    pub fn from_pairs<I, P, F>(pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (P, F)>,
        P: Into<String>,
        F: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(p, f)| (p.into(), f.into())).collect())
    }

    /// Decode the persisted form (a flat JSON object).
    pub fn from_json(json: &[u8]) -> Result<Self, Error> {
        let resources: BTreeMap<String, String> = serde_json::from_slice(json)?;
        Self::new(resources)
    }

    /// Encode the persisted form.
    pub fn to_json(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_json::to_vec(&self.resources)?)
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.resources.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.resources.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Stable identity of this manifest version.
    pub fn digest(&self) -> String {
        digest::manifest_digest(self.resources.iter().map(|(p, f)| (p.as_str(), f.as_str())))
    }

    /// True when `path` is absent here or its fingerprint differs from `previous`.
    ///
    /// Entries for which this holds must not survive an upgrade.
    pub fn is_stale(&self, previous: &Manifest, path: &str) -> bool {
        match self.get(path) {
            None => true,
            Some(current) => previous.get(path) != Some(current),
        }
    }
}

/// Hand-designated subset of the manifest staged during install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppShell {
    paths: Vec<String>,
}

impl AppShell {
    /// Build a shell list, checking that every path is governed by `manifest`.
    pub fn new<I, P>(manifest: &Manifest, paths: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let mut shell: Vec<String> = Vec::new();
        for path in paths {
            let path = path.into();
            if !manifest.contains(&path) {
                return Err(Error::InvalidManifest(format!("shell path {path} is not in the manifest")));
            }
            if !shell.contains(&path) {
                shell.push(path);
            }
        }
        Ok(Self { paths: shell })
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
