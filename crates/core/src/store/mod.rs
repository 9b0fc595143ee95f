//! Named-region cache store.
//!
//! The store is partitioned into three regions, each holding
//! request-key → response pairs:
//!
//! | Region | Lifetime | Contents |
//! |--------|----------|----------|
//! | Staging | install → end of activate | shell files fetched during install |
//! | Content | across upgrades | everything the fetch path serves |
//! | ManifestRecord | across upgrades | the last activated manifest under `"manifest"` |
//!
//! Two backends implement [`CacheStore`]: [`MemoryStore`] and the
//! SQLite-backed [`SqliteStore`].

pub mod connection;
pub mod entries;
pub mod memory;
pub mod migrations;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub use crate::Error;

pub use connection::SqliteStore;
pub use memory::MemoryStore;

/// Key under which the activated manifest is persisted.
pub const MANIFEST_KEY: &str = "manifest";

/// One of the three fixed store partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Staging,
    Content,
    ManifestRecord,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Staging, Region::Content, Region::ManifestRecord];

    pub fn name(self) -> &'static str {
        match self {
            Region::Staging => "shellkeep-temp-cache",
            Region::Content => "shellkeep-app-cache",
            Region::ManifestRecord => "shellkeep-app-manifest",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "staging" | "shellkeep-temp-cache" => Ok(Region::Staging),
            "content" | "shellkeep-app-cache" => Ok(Region::Content),
            "manifest_record" | "manifest" | "shellkeep-app-manifest" => Ok(Region::ManifestRecord),
            other => Err(Error::InvalidInput(format!("unknown region: {other}"))),
        }
    }
}

/// A stored response: status, headers and a shareable body.
///
/// Cloning is cheap; the body buffer is reference counted so the same
/// response can be written to a region and handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

impl CachedResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self { status, headers: BTreeMap::new(), body: body.into() }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Whether the status is in the 2xx range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }
}

/// Persistent key-value store partitioned into named regions.
///
/// `put` implicitly opens its region. Reads against a region that does not
/// exist behave as reads against an empty one. Single-key writes are atomic
/// and the last writer for a key wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Ensure the region exists.
    async fn open(&self, region: Region) -> Result<(), Error>;

    async fn has_region(&self, region: Region) -> Result<bool, Error>;

    /// Drop the region and every entry in it. Returns whether it existed.
    async fn delete_region(&self, region: Region) -> Result<bool, Error>;

    async fn get(&self, region: Region, key: &str) -> Result<Option<CachedResponse>, Error>;

    async fn put(&self, region: Region, key: &str, response: &CachedResponse) -> Result<(), Error>;

    /// Remove one entry. Returns whether it existed.
    async fn delete(&self, region: Region, key: &str) -> Result<bool, Error>;

    /// All keys in the region, in ascending order.
    async fn keys(&self, region: Region) -> Result<Vec<String>, Error>;
}
