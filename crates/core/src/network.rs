//! Network fetch capability.

use async_trait::async_trait;

use crate::Error;
use crate::store::CachedResponse;

/// How intermediate HTTP caches should treat a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    #[default]
    Default,
    /// Bypass intermediate caches and revalidate with the origin server.
    Reload,
}

/// An intercepted or worker-issued request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: String,
    pub url: String,
    pub cache: CacheMode,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self { method: "GET".into(), url: url.into(), cache: CacheMode::Default }
    }

    pub fn reload(url: impl Into<String>) -> Self {
        Self { cache: CacheMode::Reload, ..Self::get(url) }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Only reads are governed by the worker.
    pub fn is_read(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }
}

/// Network primitive.
///
/// Any HTTP response, whatever its status, is `Ok`. `Err` means no response
/// was obtained at all (DNS, connect, TLS, reset).
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<CachedResponse, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_read() {
        assert!(FetchRequest::get("https://a.test/").is_read());
        assert!(FetchRequest::get("https://a.test/").with_method("get").is_read());
        assert!(!FetchRequest::get("https://a.test/").with_method("POST").is_read());
    }

    #[test]
    fn test_reload_mode() {
        let request = FetchRequest::reload("https://a.test/main.dart.js");
        assert_eq!(request.cache, CacheMode::Reload);
        assert_eq!(request.method, "GET");
    }
}
