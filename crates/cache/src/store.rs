//! TTL-stamped JSON blobs on disk, one directory per namespace
//!
//! Every entry lives at `<root>/<namespace dir>/<fingerprint>.json` and holds
//! `{"payload": ..., "lastUpdated": "<RFC 3339>"}`. Reads never fail: a
//! missing, unreadable or undecodable file is a miss. Writes never fail the
//! caller: errors are logged and dropped. A write lands in a uniquely named
//! temp file first and is renamed over the target, so readers observe either
//! the old or the new content.

use crate::fingerprint::Fingerprint;
use crate::{Error, Result};
use chrono::{DateTime, TimeDelta, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// Default TTL for single-app entries
pub const DEFAULT_APP_TTL: Duration = Duration::from_secs(4 * 60 * 60);
/// Default TTL for home bundles
pub const DEFAULT_HOME_TTL: Duration = Duration::from_secs(4 * 60 * 60);
/// Default TTL for category lists
pub const DEFAULT_CATEGORY_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Independent cache categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Single application responses
    App,
    /// Category lists per app type
    Category,
    /// Home bundles and collection lists
    Home,
}

impl Namespace {
    /// All namespaces
    pub const ALL: [Self; 3] = [Self::App, Self::Category, Self::Home];

    /// Directory name under the cache root
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::App => "locker_cache",
            Self::Category => "category_cache",
            Self::Home => "home_cache",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::App => "app",
            Self::Category => "category",
            Self::Home => "home",
        };
        f.write_str(name)
    }
}

/// Retention policy of one namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Entries older than this are stale
    pub ttl: Duration,
}

impl CachePolicy {
    /// Policy with the given TTL
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    fn ttl_delta(self) -> TimeDelta {
        TimeDelta::from_std(self.ttl).unwrap_or(TimeDelta::MAX)
    }
}

/// Per-namespace policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicies {
    /// Policy for [`Namespace::App`]
    pub app: CachePolicy,
    /// Policy for [`Namespace::Category`]
    pub category: CachePolicy,
    /// Policy for [`Namespace::Home`]
    pub home: CachePolicy,
}

impl CachePolicies {
    /// Policy for a namespace
    #[must_use]
    pub const fn get(&self, namespace: Namespace) -> CachePolicy {
        match namespace {
            Namespace::App => self.app,
            Namespace::Category => self.category,
            Namespace::Home => self.home,
        }
    }
}

impl Default for CachePolicies {
    fn default() -> Self {
        Self {
            app: CachePolicy::new(DEFAULT_APP_TTL),
            category: CachePolicy::new(DEFAULT_CATEGORY_TTL),
            home: CachePolicy::new(DEFAULT_HOME_TTL),
        }
    }
}

/// A cached payload and the time it was written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached value
    pub payload: T,
    /// Write time
    #[serde(rename = "lastUpdated")]
    pub cached_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Whether the entry is younger than `ttl` at `now`
    #[must_use]
    pub fn is_fresh_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.cached_at < CachePolicy::new(ttl).ttl_delta()
    }

    /// Unwrap the payload
    pub fn into_payload(self) -> T {
        self.payload
    }
}

#[derive(Serialize)]
struct EntryRef<'a, T> {
    payload: &'a T,
    #[serde(rename = "lastUpdated")]
    cached_at: DateTime<Utc>,
}

/// What a read accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    /// Stale entries are misses
    #[default]
    FreshOnly,
    /// Stale entries are returned (degraded mode)
    AllowStale,
}

/// Namespaced TTL cache rooted at a directory
#[derive(Debug, Clone)]
pub struct DiskCache {
    root: PathBuf,
    policies: CachePolicies,
}

impl DiskCache {
    /// Cache rooted at `root` with default policies
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            policies: CachePolicies::default(),
        }
    }

    /// Replace the namespace policies
    #[must_use]
    pub fn with_policies(mut self, policies: CachePolicies) -> Self {
        self.policies = policies;
        self
    }

    /// Cache root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Active policies
    #[must_use]
    pub const fn policies(&self) -> &CachePolicies {
        &self.policies
    }

    /// Directory of a namespace
    #[must_use]
    pub fn namespace_dir(&self, namespace: Namespace) -> PathBuf {
        self.root.join(namespace.dir_name())
    }

    /// File backing a key
    #[must_use]
    pub fn entry_path(&self, namespace: Namespace, key: &Fingerprint) -> PathBuf {
        self.namespace_dir(namespace).join(key.file_name())
    }

    /// Read an entry as of now
    pub async fn read<T: DeserializeOwned>(
        &self,
        namespace: Namespace,
        key: &Fingerprint,
        freshness: Freshness,
    ) -> Option<CacheEntry<T>> {
        self.read_at(namespace, key, freshness, Utc::now()).await
    }

    /// Read an entry as of `now`
    pub async fn read_at<T: DeserializeOwned>(
        &self,
        namespace: Namespace,
        key: &Fingerprint,
        freshness: Freshness,
        now: DateTime<Utc>,
    ) -> Option<CacheEntry<T>> {
        let path = self.entry_path(namespace, key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(%namespace, %key, "cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(%namespace, %key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(
                    %namespace,
                    %key,
                    path = %path.display(),
                    error = %e,
                    "corrupt cache entry, treating as miss"
                );
                return None;
            }
        };

        if freshness == Freshness::FreshOnly
            && !entry.is_fresh_at(now, self.policies.get(namespace).ttl)
        {
            tracing::debug!(%namespace, %key, cached_at = %entry.cached_at, "cache entry stale");
            return None;
        }

        tracing::debug!(%namespace, %key, "cache hit");
        Some(entry)
    }

    /// Store a payload stamped with the current time
    pub async fn write<T: Serialize>(&self, namespace: Namespace, key: &Fingerprint, payload: &T) {
        self.write_at(namespace, key, payload, Utc::now()).await;
    }

    /// Store a payload stamped with `now`. Failures are logged, never returned.
    pub async fn write_at<T: Serialize>(
        &self,
        namespace: Namespace,
        key: &Fingerprint,
        payload: &T,
        now: DateTime<Utc>,
    ) {
        if let Err(e) = self.try_write(namespace, key, payload, now).await {
            tracing::warn!(%namespace, %key, error = %e, "cache write failed");
        }
    }

    async fn try_write<T: Serialize>(
        &self,
        namespace: Namespace,
        key: &Fingerprint,
        payload: &T,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let dir = self.namespace_dir(namespace);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::io(e, &dir, "create_dir"))?;

        let bytes = serde_json::to_vec(&EntryRef {
            payload,
            cached_at: now,
        })
        .map_err(|e| Error::serialization(e.to_string()))?;

        let target = dir.join(key.file_name());
        let tmp = dir.join(format!("{}.{}.tmp", key.file_name(), Uuid::new_v4().simple()));
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| Error::io(e, &tmp, "write"))?;
        if let Err(e) = tokio::fs::rename(&tmp, &target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(Error::io(e, &target, "rename"));
        }
        tracing::debug!(%namespace, %key, "cache entry written");
        Ok(())
    }

    /// Remove every namespace directory
    pub async fn clear(&self) -> Result<()> {
        for namespace in Namespace::ALL {
            let dir = self.namespace_dir(namespace);
            match tokio::fs::remove_dir_all(&dir).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(Error::io(e, &dir, "remove_dir")),
            }
        }
        tracing::info!(root = %self.root.display(), "catalog cache cleared");
        Ok(())
    }
}
