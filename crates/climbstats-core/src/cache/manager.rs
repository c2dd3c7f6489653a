use std::future::Future;
use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{AvailabilityCell, Climb};
use crate::utils::format_age;

/// Bumped whenever the shape of a cached table changes.
pub const CACHE_FORMAT_VERSION: u32 = 1;

pub const CLIMBS_CACHE: &str = "climbs";
pub const AVAILABILITY_CACHE: &str = "availability";

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache file {name} has format version {found}, expected {expected}")]
    VersionMismatch {
        name: String,
        found: u32,
        expected: u32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub format_version: u32,
    pub cached_at: DateTime<Utc>,
    pub data: T,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            format_version: CACHE_FORMAT_VERSION,
            cached_at: Utc::now(),
            data,
        }
    }
}

/// Only the version field, read before trusting the rest of the file.
#[derive(Deserialize)]
struct Envelope {
    format_version: u32,
}

pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    pub fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    /// Time since the cache file was last written, from its modification time.
    /// `None` when there is no cache file.
    pub fn age(&self, name: &str) -> Result<Option<Duration>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let modified = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .with_context(|| format!("Failed to read modification time of cache file: {}", name))?;
        // A modification time in the future counts as brand new
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or_default();
        Ok(Some(Duration::from_std(age).unwrap_or(Duration::MAX)))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<CachedData<T>> {
        let path = self.cache_path(name);
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let envelope: Envelope = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;
        if envelope.format_version != CACHE_FORMAT_VERSION {
            return Err(CacheError::VersionMismatch {
                name: name.to_string(),
                found: envelope.format_version,
                expected: CACHE_FORMAT_VERSION,
            }
            .into());
        }

        serde_json::from_str(&contents).with_context(|| format!("Failed to parse cache file: {}", name))
    }

    /// Write to a sibling temp file, then rename over the old entry so a crash
    /// never leaves a half-written cache file behind.
    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let path = self.cache_path(name);
        let tmp_path = self.cache_dir.join(format!("{}.json.tmp", name));
        let contents = serde_json::to_string(&cached)?;
        std::fs::write(&tmp_path, contents)
            .with_context(|| format!("Failed to write cache file: {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &path)
            .with_context(|| format!("Failed to replace cache file: {}", path.display()))?;
        Ok(())
    }

    /// Return the cached `name` table if it is younger than `max_age`,
    /// otherwise call `fetch` once, persist its result and return it.
    ///
    /// `max_age = None` means a cache file never goes stale.
    pub async fn load_or_fetch<T, F, Fut>(
        &self,
        name: &str,
        max_age: Option<Duration>,
        fetch: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(age) = self.age(name)? {
            let limit = max_age.map(format_age).unwrap_or_else(|| "none".to_string());
            if max_age.map_or(true, |max| age < max) {
                info!(cache = name, age = %format_age(age), limit = %limit, "Loading from cache");
                let cached: CachedData<T> = self.load(name)?;
                debug!(cache = name, cached_at = %cached.cached_at, "Cache loaded");
                return Ok(cached.data);
            }
            info!(cache = name, age = %format_age(age), limit = %limit, "Cache is stale");
        } else {
            debug!(cache = name, "No cache file");
        }

        let data = fetch().await?;
        info!(cache = name, path = %self.cache_path(name).display(), "Saving cache");
        self.save(name, &data)?;
        Ok(data)
    }

    // ===== Climbs =====

    pub async fn climbs_or_fetch<F, Fut>(&self, max_age: Option<Duration>, fetch: F) -> Result<Vec<Climb>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Climb>>>,
    {
        self.load_or_fetch(CLIMBS_CACHE, max_age, fetch).await
    }

    // ===== Availability =====

    pub async fn availability_or_fetch<F, Fut>(
        &self,
        max_age: Option<Duration>,
        fetch: F,
    ) -> Result<Vec<AvailabilityCell>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<AvailabilityCell>>>,
    {
        self.load_or_fetch(AVAILABILITY_CACHE, max_age, fetch).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use filetime::FileTime;

    fn manager() -> (tempfile::TempDir, CacheManager) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let cache = CacheManager::new(dir.path().join("cache")).expect("Failed to create cache manager");
        (dir, cache)
    }

    fn set_age(cache: &CacheManager, name: &str, age: Duration) {
        let when = SystemTime::now() - age.to_std().unwrap();
        filetime::set_file_mtime(cache.cache_path(name), FileTime::from_system_time(when)).unwrap();
    }

    #[tokio::test]
    async fn test_miss_fetches_once_and_writes() {
        let (_dir, cache) = manager();
        let calls = Cell::new(0);

        let data: Vec<u32> = cache
            .load_or_fetch("numbers", Some(Duration::days(10)), || async {
                calls.set(calls.get() + 1);
                Ok(vec![1, 2, 3])
            })
            .await
            .unwrap();

        assert_eq!(data, vec![1, 2, 3]);
        assert_eq!(calls.get(), 1);
        assert!(cache.cache_path("numbers").exists());
        assert!(!cache.cache_dir.join("numbers.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_hit_skips_fetch_and_leaves_file_untouched() {
        let (_dir, cache) = manager();
        let _: Vec<u32> = cache
            .load_or_fetch("numbers", Some(Duration::days(10)), || async { Ok(vec![7]) })
            .await
            .unwrap();
        let before = std::fs::read(cache.cache_path("numbers")).unwrap();
        let mtime_before = std::fs::metadata(cache.cache_path("numbers")).unwrap().modified().unwrap();

        let calls = Cell::new(0);
        let data: Vec<u32> = cache
            .load_or_fetch("numbers", Some(Duration::days(10)), || async {
                calls.set(calls.get() + 1);
                Ok(vec![8])
            })
            .await
            .unwrap();

        assert_eq!(data, vec![7]);
        assert_eq!(calls.get(), 0);
        assert_eq!(std::fs::read(cache.cache_path("numbers")).unwrap(), before);
        assert_eq!(
            std::fs::metadata(cache.cache_path("numbers")).unwrap().modified().unwrap(),
            mtime_before
        );
    }

    #[tokio::test]
    async fn test_stale_entry_is_refetched() {
        let (_dir, cache) = manager();
        let _: Vec<u32> = cache
            .load_or_fetch("numbers", Some(Duration::days(10)), || async { Ok(vec![1]) })
            .await
            .unwrap();
        set_age(&cache, "numbers", Duration::days(11));

        let data: Vec<u32> = cache
            .load_or_fetch("numbers", Some(Duration::days(10)), || async { Ok(vec![2]) })
            .await
            .unwrap();
        assert_eq!(data, vec![2]);

        let age = cache.age("numbers").unwrap().unwrap();
        assert!(age < Duration::minutes(1));
    }

    #[tokio::test]
    async fn test_no_max_age_never_expires() {
        let (_dir, cache) = manager();
        let _: Vec<u32> = cache
            .load_or_fetch("numbers", None, || async { Ok(vec![1]) })
            .await
            .unwrap();
        set_age(&cache, "numbers", Duration::days(3650));

        let data: Vec<u32> = cache
            .load_or_fetch("numbers", None, || async { Ok(vec![2]) })
            .await
            .unwrap();
        assert_eq!(data, vec![1]);
    }

    #[tokio::test]
    async fn test_fetch_error_propagates_without_writing() {
        let (_dir, cache) = manager();
        let result: Result<Vec<u32>> = cache
            .load_or_fetch("numbers", None, || async { Err(anyhow::anyhow!("network down")) })
            .await;

        assert!(result.unwrap_err().to_string().contains("network down"));
        assert!(!cache.cache_path("numbers").exists());
    }

    #[tokio::test]
    async fn test_version_mismatch_is_an_error() {
        let (_dir, cache) = manager();
        std::fs::write(
            cache.cache_path("numbers"),
            r#"{"format_version": 0, "cached_at": "2020-01-01T00:00:00Z", "data": [1]}"#,
        )
        .unwrap();

        let result: Result<Vec<u32>> = cache
            .load_or_fetch("numbers", None, || async { Ok(vec![2]) })
            .await;
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CacheError>(),
            Some(CacheError::VersionMismatch { found: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_an_error() {
        let (_dir, cache) = manager();
        std::fs::write(cache.cache_path("numbers"), "{\"format_vers").unwrap();

        let result: Result<Vec<u32>> = cache
            .load_or_fetch("numbers", None, || async { Ok(vec![2]) })
            .await;
        assert!(result.unwrap_err().to_string().contains("Failed to parse cache file"));
    }

    #[test]
    fn test_age_missing_file() {
        let (_dir, cache) = manager();
        assert!(cache.age("nothing").unwrap().is_none());
    }
}
