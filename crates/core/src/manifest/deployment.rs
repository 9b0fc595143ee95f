//! Build-time deployment file.
//!
//! The build writes one JSON document per release:
//!
//! ```json
//! { "resources": { "index.html": "6268…", "main.dart.js": "1abf…" },
//!   "shell": ["main.dart.js", "index.html"] }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::{AppShell, Manifest};
use crate::Error;

/// Raw deployment document as written by the build.
#[derive(Debug, Clone, Deserialize)]
pub struct Deployment {
    pub resources: BTreeMap<String, String>,
    #[serde(default)]
    pub shell: Vec<String>,
}

impl Deployment {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::InvalidManifest(e.to_string()))
    }

    /// Read a deployment file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::InvalidManifest(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Validate both halves and split them.
    pub fn into_parts(self) -> Result<(Manifest, AppShell), Error> {
        let manifest = Manifest::new(self.resources)?;
        let shell = AppShell::new(&manifest, self.shell)?;
        Ok((manifest, shell))
    }
}
