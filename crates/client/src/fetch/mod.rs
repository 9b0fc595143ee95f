//! HTTP fetch primitive behind the worker.
//!
//! ### Semantics
//! - Any resolved response is returned, whatever its status; the worker
//!   decides what is cacheable.
//! - Only transport failures are errors (`Error::Network`).
//! - Reload-mode requests bypass intermediate HTTP caches.
//! - No timeout: a stalled request stalls the caller.
//! - Max body bytes: 64MB (configurable)

use std::collections::BTreeMap;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Method, header};

use shellkeep_core::{CacheMode, CachedResponse, Error, FetchRequest, Fetcher};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "shellkeep/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 64MB)
    pub max_bytes: usize,

    /// Maximum number of redirects to follow (default: 10)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "shellkeep/0.1".to_string(), max_bytes: 64 * 1024 * 1024, max_redirects: 10 }
    }
}

/// HTTP client implementing the worker's network capability.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn check_size(&self, len: usize) -> Result<(), Error> {
        if len > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{len} bytes exceeds {}", self.config.max_bytes)));
        }
        Ok(())
    }
}

#[async_trait]
impl Fetcher for FetchClient {
    async fn fetch(&self, request: &FetchRequest) -> Result<CachedResponse, Error> {
        let start = Instant::now();
        let url = url::Url::parse(&request.url).map_err(|e| Error::InvalidUrl(format!("{}: {e}", request.url)))?;
        let method = Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| Error::InvalidInput(format!("invalid method: {}", request.method)))?;

        let mut builder = self.http.request(method, url.as_str());
        if request.cache == CacheMode::Reload {
            builder = builder
                .header(header::CACHE_CONTROL, "no-cache")
                .header(header::PRAGMA, "no-cache");
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Network(format!("{url}: {e}")))?;

        let status = response.status().as_u16();
        if let Some(len) = response.content_length() {
            self.check_size(usize::try_from(len).unwrap_or(usize::MAX))?;
        }

        let headers = header_map(response.headers());
        let body: Bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read {url}: {e}")))?;
        self.check_size(body.len())?;

        tracing::debug!(
            url = %url,
            status,
            bytes = body.len(),
            reload = request.cache == CacheMode::Reload,
            fetch_ms = start.elapsed().as_millis() as u64,
            "fetched"
        );

        Ok(CachedResponse { status, headers, body })
    }
}

/// Flatten response headers into lowercase names; repeated headers are
/// joined with `, `.
fn header_map(headers: &header::HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hand back the raw request text.
    async fn serve_once(response: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&buf[..n]).to_lowercase()
        });
        (format!("http://{addr}"), handle)
    }

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "shellkeep/0.1");
        assert_eq!(config.max_bytes, 64 * 1024 * 1024);
        assert_eq!(config.max_redirects, 10);
    }

    #[test]
    fn test_header_map_joins_repeats() {
        let mut headers = header::HeaderMap::new();
        headers.append(header::CONTENT_TYPE, "application/javascript".parse().unwrap());
        headers.append(header::VARY, "accept".parse().unwrap());
        headers.append(header::VARY, "accept-encoding".parse().unwrap());

        let map = header_map(&headers);
        assert_eq!(map.get("content-type").map(String::as_str), Some("application/javascript"));
        assert_eq!(map.get("vary").map(String::as_str), Some("accept, accept-encoding"));
    }

    #[tokio::test]
    async fn test_fetch_client_new() {
        assert!(FetchClient::new(FetchConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_returns_body_and_headers() {
        let (base, server) = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: application/javascript\r\ncontent-length: 9\r\nconnection: close\r\n\r\nmain();//",
        )
        .await;
        let client = FetchClient::new(FetchConfig::default()).unwrap();

        let response = client.fetch(&FetchRequest::get(format!("{base}/main.dart.js"))).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type(), Some("application/javascript"));
        assert_eq!(&response.body[..], b"main();//");

        let raw = server.await.unwrap();
        assert!(raw.starts_with("get /main.dart.js"));
        assert!(!raw.contains("pragma: no-cache"));
    }

    #[tokio::test]
    async fn test_reload_bypasses_http_cache() {
        let (base, server) =
            serve_once("HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok").await;
        let client = FetchClient::new(FetchConfig::default()).unwrap();

        client.fetch(&FetchRequest::reload(format!("{base}/index.html"))).await.unwrap();

        let raw = server.await.unwrap();
        assert!(raw.contains("cache-control: no-cache"));
        assert!(raw.contains("pragma: no-cache"));
    }

    #[tokio::test]
    async fn test_error_status_is_not_an_error() {
        let (base, _server) =
            serve_once("HTTP/1.1 404 Not Found\r\ncontent-length: 4\r\nconnection: close\r\n\r\ngone").await;
        let client = FetchClient::new(FetchConfig::default()).unwrap();

        let response = client.fetch(&FetchRequest::get(format!("{base}/flutter.js"))).await.unwrap();
        assert_eq!(response.status, 404);
        assert!(!response.is_ok());
    }

    #[tokio::test]
    async fn test_body_over_limit() {
        let (base, _server) =
            serve_once("HTTP/1.1 200 OK\r\ncontent-length: 16\r\nconnection: close\r\n\r\n0123456789abcdef").await;
        let client = FetchClient::new(FetchConfig { max_bytes: 8, ..Default::default() }).unwrap();

        let result = client.fetch(&FetchRequest::get(format!("{base}/assets/big.bin"))).await;
        assert!(matches!(result, Err(Error::FetchTooLarge(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = FetchClient::new(FetchConfig::default()).unwrap();
        let result = client.fetch(&FetchRequest::get(format!("http://{addr}/"))).await;
        assert!(matches!(result, Err(Error::Network(_))));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let client = FetchClient::new(FetchConfig::default()).unwrap();
        let result = client.fetch(&FetchRequest::get("not a url")).await;
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }
}
