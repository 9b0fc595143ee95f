//! Origin handling and request-key normalization.
//!
//! Cache entries are keyed by origin-relative path, the same form the
//! manifest uses: `main.dart.js`, `assets/FontManifest.json`, and `/` for
//! the origin root.

use std::fmt;

use crate::Error;
use crate::manifest::ROOT_PATH;

/// Cache-busting query marker appended by the bootstrap script.
const VERSION_QUERY: &str = "?v=";

/// The origin the worker is scoped to, without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin(String);

impl Origin {
    /// Canonicalize an origin string.
    ///
    /// Normalization steps:
    /// 1. Trim leading/trailing whitespace
    /// 2. Default scheme to https:// if missing
    /// 3. Lowercase the host
    /// 4. Remove fragment (#...)
    ///
    /// A path other than `/` or any query string is rejected.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(Error::InvalidUrl("empty origin".into()));
        }

        let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

        let mut parsed = url::Url::parse(&url_str).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        match parsed.scheme() {
            "http" | "https" => {}
            scheme => return Err(Error::InvalidUrl(format!("unsupported scheme: {scheme}"))),
        }

        if let Some(host) = parsed.host_str() {
            let host = host.to_lowercase();
            parsed
                .set_host(Some(&host))
                .map_err(|e| Error::InvalidUrl(e.to_string()))?;
        }

        parsed.set_fragment(None);

        if parsed.path() != "/" || parsed.query().is_some() {
            return Err(Error::InvalidUrl(format!("origin must not carry a path or query: {trimmed}")));
        }

        Ok(Self(parsed.as_str().trim_end_matches('/').to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Normalize a request URL to its cache key.
    ///
    /// Returns `None` for URLs outside this origin. The origin itself, a
    /// fragment-only navigation (`origin/#/route`) and an empty remainder all
    /// map to `/`. Anything after `?v=` is dropped.
    pub fn request_key(&self, url: &str) -> Option<String> {
        let rest = url.strip_prefix(self.0.as_str())?;

        if rest.is_empty() || rest.starts_with("/#") {
            return Some(ROOT_PATH.to_string());
        }

        let mut key = rest.strip_prefix('/')?;

        if let Some((head, _)) = key.split_once(VERSION_QUERY) {
            key = head;
        }
        if let Some((head, _)) = key.split_once('#') {
            key = head;
        }

        if key.is_empty() { Some(ROOT_PATH.to_string()) } else { Some(key.to_string()) }
    }

    /// Normalize a key read back from a store region.
    ///
    /// Accepts absolute same-origin URLs as well as already-relative keys.
    pub fn stored_key(&self, key: &str) -> String {
        if let Some(normalized) = self.request_key(key) {
            return normalized;
        }
        match key.trim_start_matches('/') {
            "" => ROOT_PATH.to_string(),
            relative => relative.to_string(),
        }
    }

    /// Absolute URL for a manifest path.
    pub fn url_for(&self, key: &str) -> String {
        if key == ROOT_PATH { format!("{}/", self.0) } else { format!("{}/{}", self.0, key.trim_start_matches('/')) }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
