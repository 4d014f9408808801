//! Source registry
//!
//! Owns the ordered list of catalog sources and their home collections on
//! top of the persisted tables. The registry also owns the task that keeps
//! the account-backed source's enabled flag in step with the login state;
//! that task stops on [`SourceRegistry::shutdown`] or when the registry is
//! dropped.

use super::defaults::{
    ACCOUNT_SOURCE_URL, PRIMARY_SOURCE_TITLE, PRIMARY_SOURCE_URL, default_sources,
    is_primary_source,
};
use super::model::{AppstoreCollection, CatalogSource, NewCatalogSource, SourceId};
use super::store::{CollectionStore, SourceStore};
use crate::Result;
use crate::model::{AppType, StoreCollection};
use appstore_cache::DiskCache;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct LoginFollow {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Ordered registry of catalog sources
pub struct SourceRegistry {
    sources: Arc<dyn SourceStore>,
    collections: Arc<dyn CollectionStore>,
    cache: Option<DiskCache>,
    login_follow: Mutex<Option<LoginFollow>>,
}

impl SourceRegistry {
    /// Registry over the given tables
    pub fn new(sources: Arc<dyn SourceStore>, collections: Arc<dyn CollectionStore>) -> Self {
        Self {
            sources,
            collections,
            cache: None,
            login_follow: Mutex::new(None),
        }
    }

    /// Cache cleared whenever defaults are re-seeded
    #[must_use]
    pub fn with_cache(mut self, cache: DiskCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Seed the default sources when the table is empty, when a row lacks
    /// search credentials, or when the primary source is missing or carries
    /// an outdated title. Seeding replaces every row and clears the cache.
    ///
    /// Returns whether a seed happened.
    pub async fn initialize(&self) -> Result<bool> {
        let current = self.sources.get_all_sources().await?;
        if !needs_seed(&current) {
            tracing::debug!(count = current.len(), "catalog sources already initialized");
            return Ok(false);
        }

        tracing::info!(existing = current.len(), "seeding default catalog sources");
        for source in &current {
            self.sources.delete_source(source.id).await?;
        }
        for source in default_sources() {
            self.sources.insert_source(source).await?;
        }
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.clear().await {
                tracing::warn!(error = %e, "failed to clear catalog cache after seeding");
            }
        }
        Ok(true)
    }

    /// Every source in stable order
    pub async fn list_all(&self) -> Result<Vec<CatalogSource>> {
        self.sources.get_all_sources().await
    }

    /// Enabled sources in stable order
    pub async fn list_enabled(&self) -> Result<Vec<CatalogSource>> {
        let mut sources = self.sources.get_all_sources().await?;
        sources.retain(|s| s.enabled);
        Ok(sources)
    }

    /// Add a source
    pub async fn add(&self, source: NewCatalogSource) -> Result<SourceId> {
        let url = source.url.clone();
        let id = self.sources.insert_source(source).await?;
        tracing::info!(id, %url, "catalog source added");
        Ok(id)
    }

    /// Enable or disable a source
    pub async fn set_enabled(&self, id: SourceId, enabled: bool) -> Result<()> {
        self.sources.set_source_enabled(id, enabled).await?;
        tracing::info!(id, enabled, "catalog source toggled");
        Ok(())
    }

    /// Remove a source and its collections
    pub async fn delete(&self, id: SourceId) -> Result<()> {
        self.sources.delete_source(id).await?;
        tracing::info!(id, "catalog source removed");
        Ok(())
    }

    /// Look up by id
    pub async fn get(&self, id: SourceId) -> Result<Option<CatalogSource>> {
        self.sources.get_source_by_id(id).await
    }

    /// Look up by base URL
    pub async fn find_by_url(&self, url: &str) -> Result<Option<CatalogSource>> {
        Ok(self
            .sources
            .get_all_sources()
            .await?
            .into_iter()
            .find(|s| s.url == url))
    }

    /// Keep the account-backed source enabled exactly while `logged_in` is
    /// true. Replaces any previous follow task. Returns `false` when the
    /// account-backed source is not configured.
    pub async fn follow_login(&self, mut logged_in: watch::Receiver<bool>) -> bool {
        let source = match self.find_by_url(ACCOUNT_SOURCE_URL).await {
            Ok(Some(source)) => source,
            Ok(None) => {
                tracing::debug!("account-backed source not configured, not following login");
                return false;
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not look up account-backed source");
                return false;
            }
        };

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let store = Arc::clone(&self.sources);
        let id = source.id;
        let handle = tokio::spawn(async move {
            loop {
                let enabled = *logged_in.borrow_and_update();
                if let Err(e) = store.set_source_enabled(id, enabled).await {
                    tracing::warn!(id, error = %e, "failed to follow login state");
                }
                tokio::select! {
                    () = cancelled.cancelled() => break,
                    changed = logged_in.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!(id, "login follow stopped");
        });

        let previous = self
            .login_follow
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(LoginFollow { token, handle });
        if let Some(previous) = previous {
            previous.token.cancel();
        }
        true
    }

    /// Stop the login follow task and wait for it
    pub async fn shutdown(&self) {
        let follow = self
            .login_follow
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(follow) = follow {
            follow.token.cancel();
            if let Err(e) = follow.handle.await {
                tracing::warn!(error = %e, "login follow task failed");
            }
        }
    }

    /// Replace the collections of one source and app type with those of a
    /// fresh home bundle. Existing rows keep their id and enabled flag; new
    /// rows get [`collection_enabled_by_default`]; vanished slugs are deleted.
    pub async fn update_collections(
        &self,
        source: &CatalogSource,
        app_type: AppType,
        collections: &[StoreCollection],
    ) -> Result<()> {
        let existing: Vec<AppstoreCollection> = self
            .collections
            .get_all_collections()
            .await?
            .into_iter()
            .filter(|c| c.source_id == source.id && c.app_type == app_type)
            .collect();

        for collection in collections {
            let previous = existing.iter().find(|c| c.slug == collection.slug);
            let row = AppstoreCollection {
                id: previous.map_or(0, |c| c.id),
                source_id: source.id,
                title: collection.name.clone(),
                app_type,
                slug: collection.slug.clone(),
                enabled: previous.map_or_else(
                    || collection_enabled_by_default(source, &collection.slug),
                    |c| c.enabled,
                ),
            };
            self.collections.upsert_collection(row).await?;
        }

        for stale in existing
            .iter()
            .filter(|c| !collections.iter().any(|n| n.slug == c.slug))
        {
            self.collections.delete_collection(stale.id).await?;
        }
        Ok(())
    }

    /// Collections, optionally narrowed to one source and app type
    pub async fn collections(
        &self,
        source_id: Option<SourceId>,
        app_type: Option<AppType>,
    ) -> Result<Vec<AppstoreCollection>> {
        let mut rows = self.collections.get_all_collections().await?;
        rows.retain(|c| {
            source_id.is_none_or(|id| c.source_id == id)
                && app_type.is_none_or(|t| c.app_type == t)
        });
        Ok(rows)
    }

    /// Toggle one collection
    pub async fn set_collection_enabled(
        &self,
        source_id: SourceId,
        slug: &str,
        app_type: AppType,
        enabled: bool,
    ) -> Result<()> {
        let row = self
            .collections
            .get_collection(source_id, slug, app_type)
            .await?
            .ok_or_else(|| crate::Error::not_found("collection", slug))?;
        self.collections
            .upsert_collection(AppstoreCollection { enabled, ..row })
            .await?;
        Ok(())
    }
}

impl Drop for SourceRegistry {
    fn drop(&mut self) {
        let follow = self
            .login_follow
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(follow) = follow {
            follow.token.cancel();
        }
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("cache", &self.cache.as_ref().map(DiskCache::root))
            .finish_non_exhaustive()
    }
}

fn needs_seed(current: &[CatalogSource]) -> bool {
    current.is_empty()
        || current.iter().any(|s| s.search_app_id.is_none())
        || current
            .iter()
            .find(|s| s.url == PRIMARY_SOURCE_URL)
            .is_none_or(|s| s.title != PRIMARY_SOURCE_TITLE)
}

/// Initial enabled flag of a newly seen collection: `all-generated` is off,
/// `all` is on, anything else is on only for the primary source.
#[must_use]
pub fn collection_enabled_by_default(source: &CatalogSource, slug: &str) -> bool {
    match slug {
        "all-generated" => false,
        "all" => true,
        _ => is_primary_source(&source.url),
    }
}
