//! Rate-limited, cache-backed HTTP retrieval.
//!
//! # Architecture
//!
//! - [`Fetch`]: Core trait defining async retrieval of one URL
//! - [`Fetcher`]: The network implementation, constructed from a
//!   [`FetcherConfig`] and owned by the pipeline driver
//! - [`RetryFetch`]: Decorator that adds backoff retries to any `Fetch`
//!
//! The fetcher consults the response cache before touching the network, so
//! cache hits neither wait for nor consume the rate budget. Misses wait for
//! the limiter, which spaces requests evenly at `requests_per_minute`, and
//! every successful response is written through to the cache.

pub mod cache;
pub mod retry;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

pub use retry::RetryFetch;

use self::cache::ResponseCache;
use crate::config::FetcherConfig;
use crate::errors::{FetchError, PipelineError, PipelineResult};

/// Trait for retrieving the text of a document by URL.
///
/// Implementors return the body of a successful response; any network failure
/// or non-2xx status is a [`FetchError`].
pub trait Fetch {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

impl<T: Fetch> Fetch for &T {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch(url).await
    }
}

/// HTTP client with a shared rate budget and a write-through disk cache.
pub struct Fetcher {
    client: reqwest::Client,
    limiter: DefaultDirectRateLimiter,
    cache: ResponseCache,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Fetcher {
    pub fn new(config: &FetcherConfig) -> PipelineResult<Self> {
        let quota = quota_per_minute(config.requests_per_minute)?;
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::Config(format!("cannot build HTTP client: {e}")))?;

        let cache = ResponseCache::new(&config.cache_dir);
        info!(
            requests_per_minute = config.requests_per_minute,
            cache_dir = %cache.dir().display(),
            "Fetcher initialized"
        );
        Ok(Self {
            client,
            limiter: RateLimiter::direct(quota),
            cache,
        })
    }

    async fn download(&self, url: &url::Url) -> Result<String, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        self.limiter.until_ready().await;
        let t0 = Instant::now();
        let response = self.client.get(url.clone()).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Non-success response");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text().await.map_err(transport)?;
        debug!(%url, bytes = body.len(), elapsed_ms = t0.elapsed().as_millis(), "Downloaded");
        Ok(body)
    }
}

impl Fetch for Fetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let normalized = cache::normalize_url(url)?;
        let cache_err = |source| FetchError::Cache {
            url: normalized.to_string(),
            source,
        };

        if let Some(body) = self.cache.get(&normalized).await.map_err(cache_err)? {
            return Ok(body);
        }

        let body = self.download(&normalized).await?;
        self.cache.put(&normalized, &body).await.map_err(cache_err)?;
        Ok(body)
    }
}

/// Quota admitting one request every `60s / requests_per_minute`, no bursts.
fn quota_per_minute(requests_per_minute: u32) -> PipelineResult<Quota> {
    let rpm = NonZeroU32::new(requests_per_minute).ok_or_else(|| {
        PipelineError::Config("requests_per_minute must be greater than zero".to_string())
    })?;
    let period = Duration::from_secs(60) / rpm.get();
    Quota::with_period(period)
        .map(|q| q.allow_burst(NonZeroU32::MIN))
        .ok_or_else(|| PipelineError::Config(format!("rate of {rpm} requests/minute is too high")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn config_in(dir: &std::path::Path, rpm: u32) -> FetcherConfig {
        FetcherConfig {
            requests_per_minute: rpm,
            cache_dir: dir.join("cache"),
            timeout_secs: 5,
            ..FetcherConfig::default()
        }
    }

    /// Serve `responses` to successive connections on a local port.
    async fn serve(responses: Vec<&'static str>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            for response in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                socket.write_all(response.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_quota_rejects_zero() {
        assert!(quota_per_minute(0).is_err());
        assert!(quota_per_minute(60).is_ok());
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network_and_rate_budget() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(&config_in(tmp.path(), 1)).unwrap();

        // Nothing listens on this port; only the cache can answer.
        let url = "http://127.0.0.1:9/briefing-room/press-briefings?page=0";
        let normalized = cache::normalize_url(url).unwrap();
        fetcher.cache.put(&normalized, "<ul class=\"entry-list\"></ul>").await.unwrap();

        for _ in 0..3 {
            let body = fetcher.fetch(url).await.unwrap();
            assert!(body.contains("entry-list"));
        }
        assert!(fetcher.limiter.check().is_ok());
    }

    #[tokio::test]
    async fn test_miss_writes_through_to_cache() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(&config_in(tmp.path(), 600)).unwrap();
        let base = serve(vec![
            "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: 22\r\nConnection: close\r\n\r\n<p>hello — world</p>",
        ])
        .await;
        let url = format!("{base}/transcript");

        let body = fetcher.fetch(&url).await.unwrap();
        assert_eq!(body, "<p>hello — world</p>");

        let cached = fetcher
            .cache
            .get(&cache::normalize_url(&url).unwrap())
            .await
            .unwrap();
        assert_eq!(cached.as_deref(), Some("<p>hello — world</p>"));

        // The server only answers once; the second fetch must come from disk.
        assert_eq!(fetcher.fetch(&url).await.unwrap(), body);
    }

    #[tokio::test]
    async fn test_misses_are_spaced_by_the_rate_budget() {
        let tmp = tempfile::tempdir().unwrap();
        // 600 requests/minute: one request every 100ms
        let fetcher = Fetcher::new(&config_in(tmp.path(), 600)).unwrap();
        let ok = "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok";
        let base = serve(vec![ok, ok]).await;

        let started = Instant::now();
        fetcher.fetch(&format!("{base}/first")).await.unwrap();
        assert!(fetcher.limiter.check().is_err());

        fetcher.fetch(&format!("{base}/second")).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(80));
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_error() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = Fetcher::new(&config_in(tmp.path(), 600)).unwrap();
        let base = serve(vec![
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        ])
        .await;
        let url = format!("{base}/missing");

        let err = fetcher.fetch(&url).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(err.url().ends_with("/missing"));
        assert!(
            fetcher
                .cache
                .get(&cache::normalize_url(&url).unwrap())
                .await
                .unwrap()
                .is_none()
        );
    }
}
