//! Persistent on-disk response cache.
//!
//! One file per URL, named by the SHA-256 of the normalized URL, holding the
//! response body exactly as received. The cache is write-through: every new
//! successful response is stored, and stored responses are served forever.

use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};
use url::Url;

use crate::errors::FetchError;

/// Normalize a URL for cache lookup.
///
/// Parsing lower-cases scheme and host and resolves dot segments; the
/// fragment never reaches the server so it is dropped.
pub fn normalize_url(raw: &str) -> Result<Url, FetchError> {
    let mut url = Url::parse(raw.trim()).map_err(|source| FetchError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;
    url.set_fragment(None);
    Ok(url)
}

#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache file for a normalized URL.
    pub fn entry_path(&self, url: &Url) -> PathBuf {
        let digest = Sha256::digest(url.as_str().as_bytes());
        self.dir.join(format!("{}.html", hex::encode(digest)))
    }

    /// Stored body for `url`, if any.
    #[instrument(level = "debug", skip_all, fields(%url))]
    pub async fn get(&self, url: &Url) -> io::Result<Option<String>> {
        match fs::read(self.entry_path(url)).await {
            Ok(bytes) => {
                debug!(bytes = bytes.len(), "Cache hit");
                Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(level = "debug", skip_all, fields(%url, bytes = body.len()))]
    pub async fn put(&self, url: &Url, body: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        fs::write(self.entry_path(url), body.as_bytes()).await?;
        debug!("Cached response");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_drops_fragment_and_lowercases_host() {
        let a = normalize_url("HTTP://WWW.WhiteHouse.gov/briefing-room/press-briefings?page=1#top").unwrap();
        let b = normalize_url("http://www.whitehouse.gov/briefing-room/press-briefings?page=1").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_normalize_rejects_relative_urls() {
        let err = normalize_url("/the-press-office/2014/01/02/briefing").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[test]
    fn test_distinct_pages_get_distinct_entries() {
        let cache = ResponseCache::new("/tmp/cache");
        let p0 = normalize_url("http://example.com/list?page=0").unwrap();
        let p1 = normalize_url("http://example.com/list?page=1").unwrap();
        assert_ne!(cache.entry_path(&p0), cache.entry_path(&p1));
        assert!(cache.entry_path(&p0).starts_with("/tmp/cache"));
    }

    #[tokio::test]
    async fn test_put_then_get_preserves_unicode() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(tmp.path().join("cache"));
        let url = normalize_url("http://example.com/t").unwrap();

        assert_eq!(cache.get(&url).await.unwrap(), None);
        cache.put(&url, "“Quoted” — dash").await.unwrap();
        assert_eq!(
            cache.get(&url).await.unwrap().as_deref(),
            Some("“Quoted” — dash")
        );
    }
}
