//! Per-source catalog fetcher
//!
//! [`SourceClient`] reads through and writes through the disk cache. Every
//! public operation degrades to `None` or an empty list on failure and logs
//! why; callers treat that as "source unavailable for this request".

use crate::categories::default_categories;
use crate::http::HttpTransport;
use crate::search::{AlgoliaSearch, SearchIndex};
use crate::{Error, Result};
use appstore_cache::{DiskCache, Fingerprint, Freshness, Namespace};
use appstore_core::model::{
    AccountLockerEntry, AppStoreHome, AppType, BulkStoreResponse, ClientPlatform,
    StoreAppResponse, StoreApplication, StoreCategory, StoreSearchResult, WatchPlatform,
};
use appstore_core::sources::{CatalogSource, is_account_source};
use appstore_core::{Config, SourceRegistry};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Ids per bulk request
pub const BULK_CHUNK_SIZE: usize = 500;

const ONE_BY_ONE_THROTTLE_THRESHOLD: usize = 20;
const ONE_BY_ONE_THROTTLE: Duration = Duration::from_millis(50);

/// Shared state for every source client
pub struct CatalogContext {
    http: HttpTransport,
    cache: DiskCache,
    search: Arc<dyn SearchIndex>,
    client_platform: ClientPlatform,
    fetch_concurrency: usize,
}

impl CatalogContext {
    /// Context with Algolia search, the Android client platform and ten
    /// concurrent one-by-one fetches
    #[must_use]
    pub fn new(http: HttpTransport, cache: DiskCache) -> Self {
        let search = Arc::new(AlgoliaSearch::new(http.clone()));
        Self {
            http,
            cache,
            search,
            client_platform: ClientPlatform::default(),
            fetch_concurrency: 10,
        }
    }

    /// Context built from configuration
    pub fn from_config(config: &Config, cache: DiskCache) -> Result<Self> {
        let http = HttpTransport::from_config(config)?;
        Ok(Self::new(http, cache.with_policies(config.cache_policies()))
            .with_client_platform(config.client_platform())
            .with_fetch_concurrency(config.fetch_concurrency()))
    }

    /// Replace the search-index client
    #[must_use]
    pub fn with_search(mut self, search: Arc<dyn SearchIndex>) -> Self {
        self.search = search;
        self
    }

    /// Phone OS reported to catalogs
    #[must_use]
    pub const fn with_client_platform(mut self, platform: ClientPlatform) -> Self {
        self.client_platform = platform;
        self
    }

    /// Concurrent one-by-one fetches, at least 1
    #[must_use]
    pub fn with_fetch_concurrency(mut self, concurrency: usize) -> Self {
        self.fetch_concurrency = concurrency.max(1);
        self
    }

    /// Backing cache
    #[must_use]
    pub const fn cache(&self) -> &DiskCache {
        &self.cache
    }

    /// Phone OS reported to catalogs
    #[must_use]
    pub const fn client_platform(&self) -> ClientPlatform {
        self.client_platform
    }
}

impl std::fmt::Debug for CatalogContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogContext")
            .field("http", &self.http)
            .field("cache", &self.cache)
            .field("client_platform", &self.client_platform)
            .field("fetch_concurrency", &self.fetch_concurrency)
            .finish_non_exhaustive()
    }
}

/// One page of a paged collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionPage {
    /// Applications on this page
    pub apps: Vec<StoreApplication>,
    /// Offset of the previous page, if any
    pub prev_offset: Option<u32>,
    /// Offset of the next page; only set when this page was full
    pub next_offset: Option<u32>,
}

/// An account locker row resolved to its catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountApp {
    /// The account row
    pub entry: AccountLockerEntry,
    /// Catalog entry for `entry.appstore_id`
    pub app: StoreApplication,
}

#[derive(Debug, Serialize)]
struct BulkRequest<'a> {
    ids: Vec<&'a str>,
}

/// Catalog client bound to one source
#[derive(Debug, Clone)]
pub struct SourceClient {
    source: CatalogSource,
    ctx: Arc<CatalogContext>,
    registry: Option<Arc<SourceRegistry>>,
    bulk_fetch: bool,
}

impl SourceClient {
    /// Client for `source`
    #[must_use]
    pub fn new(source: CatalogSource, ctx: Arc<CatalogContext>) -> Self {
        let bulk_fetch = !is_account_source(&source.url);
        Self {
            source,
            ctx,
            registry: None,
            bulk_fetch,
        }
    }

    /// Keep the collections table in step with fetched home bundles
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<SourceRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// The bound source
    #[must_use]
    pub const fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// Override bulk-endpoint support
    #[must_use]
    pub const fn with_bulk_fetch(mut self, enabled: bool) -> Self {
        self.bulk_fetch = enabled;
        self
    }

    /// Whether the source has a bulk endpoint. The account-backed legacy
    /// source does not.
    #[must_use]
    pub const fn supports_bulk_fetch(&self) -> bool {
        self.bulk_fetch
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.source.url.trim_end_matches('/'), path)
    }

    fn platform_params(&self, hardware: Option<WatchPlatform>) -> Vec<(String, String)> {
        let mut params = vec![(
            "platform".to_string(),
            self.ctx.client_platform.store_code().to_string(),
        )];
        if let Some(hardware) = hardware {
            params.push(("hardware".to_string(), hardware.codename().to_string()));
        }
        params
    }

    fn key(&self, entity: &str, params: &[(String, String)]) -> Fingerprint {
        Fingerprint::compute(
            &self.source.url,
            entity,
            params.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )
    }

    fn category_key(&self, app_type: AppType) -> Fingerprint {
        Fingerprint::compute(
            &self.source.url,
            &format!("categories/{}", app_type.code()),
            std::iter::empty::<(&str, &str)>(),
        )
    }

    /// Fetch one application by store id
    pub async fn fetch_app(
        &self,
        id: &str,
        hardware: Option<WatchPlatform>,
        use_cache: bool,
    ) -> Option<StoreAppResponse> {
        let params = self.platform_params(hardware);
        let key = self.key(id, &params);
        if use_cache {
            if let Some(hit) = self
                .ctx
                .cache
                .read::<StoreAppResponse>(Namespace::App, &key, Freshness::FreshOnly)
                .await
            {
                return Some(hit.into_payload());
            }
        }

        let url = self.url(&format!("v1/apps/id/{id}"));
        match self.ctx.http.get_json::<StoreAppResponse>(&url, &params).await {
            Ok(response) => {
                self.ctx.cache.write(Namespace::App, &key, &response).await;
                Some(response)
            }
            Err(e) => {
                tracing::warn!(source = %self.source.url, id, error = %e, "failed to fetch app");
                None
            }
        }
    }

    /// Fetch the home bundle for `app_type`
    ///
    /// A network fetch also refreshes the cached category list and the
    /// collections table. Applications without a usable universal id are
    /// dropped from the returned bundle.
    pub async fn fetch_home(
        &self,
        app_type: AppType,
        hardware: Option<WatchPlatform>,
        use_cache: bool,
    ) -> Option<AppStoreHome> {
        let mut params = self.platform_params(hardware);
        params.push(("filter_hardware".to_string(), "true".to_string()));
        let key = self.key(&format!("home/{}", app_type.code()), &params);

        if use_cache {
            if let Some(hit) = self
                .ctx
                .cache
                .read::<AppStoreHome>(Namespace::Home, &key, Freshness::FreshOnly)
                .await
            {
                return Some(self.without_unidentified_apps(hit.into_payload()));
            }
        }

        let url = self.url(&format!("v1/home/{}", app_type.store_path()));
        let home = match self.ctx.http.get_json::<AppStoreHome>(&url, &params).await {
            Ok(home) => home,
            Err(e) => {
                tracing::warn!(
                    source = %self.source.url,
                    app_type = %app_type,
                    error = %e,
                    "failed to fetch home"
                );
                return None;
            }
        };

        self.ctx
            .cache
            .write(Namespace::Category, &self.category_key(app_type), &home.categories)
            .await;
        if let Some(registry) = &self.registry {
            if let Err(e) = registry
                .update_collections(&self.source, app_type, &home.collections)
                .await
            {
                tracing::warn!(source = %self.source.url, error = %e, "failed to update collections");
            }
        }
        self.ctx.cache.write(Namespace::Home, &key, &home).await;
        Some(self.without_unidentified_apps(home))
    }

    fn without_unidentified_apps(&self, mut home: AppStoreHome) -> AppStoreHome {
        home.applications.retain(|app| {
            let keep = app.parsed_uuid().is_some();
            if !keep {
                tracing::warn!(
                    source = %self.source.url,
                    title = %app.title,
                    uuid = ?app.uuid,
                    "skipping app with missing, invalid or nil uuid"
                );
            }
            keep
        });
        home
    }

    /// Cached category list for `app_type`
    pub async fn cached_categories(&self, app_type: AppType) -> Option<Vec<StoreCategory>> {
        self.ctx
            .cache
            .read::<Vec<StoreCategory>>(
                Namespace::Category,
                &self.category_key(app_type),
                Freshness::FreshOnly,
            )
            .await
            .map(appstore_cache::CacheEntry::into_payload)
    }

    /// Cached categories or the built-in defaults. `None` yields the app
    /// categories followed by the face categories.
    pub async fn cached_categories_or_defaults(
        &self,
        app_type: Option<AppType>,
    ) -> Vec<StoreCategory> {
        match app_type {
            Some(app_type) => self.categories_for(app_type).await,
            None => {
                let mut categories = self.categories_for(AppType::Watchapp).await;
                categories.extend(self.categories_for(AppType::Watchface).await);
                categories
            }
        }
    }

    async fn categories_for(&self, app_type: AppType) -> Vec<StoreCategory> {
        match self.cached_categories(app_type).await {
            Some(categories) => categories,
            None => default_categories(app_type),
        }
    }

    /// Categories for `app_type`: the cache, then the home bundle, then the
    /// built-in defaults
    pub async fn fetch_categories(&self, app_type: AppType, use_cache: bool) -> Vec<StoreCategory> {
        if use_cache {
            if let Some(categories) = self.cached_categories(app_type).await {
                return categories;
            }
        }
        match self.fetch_home(app_type, None, use_cache).await {
            Some(home) => home.categories,
            None => default_categories(app_type),
        }
    }

    /// One page of `{base}/v1/apps/{path}[/{apps|faces}]`
    pub async fn fetch_collection(
        &self,
        path: &str,
        app_type: Option<AppType>,
        hardware: WatchPlatform,
        offset: u32,
        limit: u32,
    ) -> Option<CollectionPage> {
        let mut params = self.platform_params(Some(hardware));
        params.push(("offset".to_string(), offset.to_string()));
        params.push(("limit".to_string(), limit.to_string()));
        let mut url = self.url(&format!("v1/apps/{}", path.trim_matches('/')));
        if let Some(app_type) = app_type {
            url.push('/');
            url.push_str(app_type.store_path());
        }

        match self.ctx.http.get_json::<StoreAppResponse>(&url, &params).await {
            Ok(response) => {
                let full = usize::try_from(limit).is_ok_and(|limit| response.data.len() == limit);
                Some(CollectionPage {
                    prev_offset: (offset > 0).then(|| offset.saturating_sub(limit)),
                    next_offset: full.then(|| offset + limit),
                    apps: response.data,
                })
            }
            Err(e) => {
                tracing::warn!(source = %self.source.url, path, error = %e, "failed to fetch collection");
                None
            }
        }
    }

    async fn search_hits(&self, query: &str, tag: Option<&str>) -> Result<Vec<StoreSearchResult>> {
        let credentials = self
            .source
            .search_credentials()
            .ok_or_else(|| Error::missing_search_credentials(&self.source.url))?;
        let hits = self.ctx.search.query(&credentials, query, tag).await?;
        Ok(hits
            .into_iter()
            .filter_map(|hit| match serde_json::from_value::<StoreSearchResult>(hit) {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::warn!(source = %self.source.url, error = %e, "skipping undecodable search hit");
                    None
                }
            })
            .collect())
    }

    /// Free-text search of this source's index
    pub async fn search(&self, query: &str, app_type: Option<AppType>) -> Vec<StoreSearchResult> {
        match self.search_hits(query, app_type.map(AppType::code)).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(source = %self.source.url, query, error = %e, "search failed");
                Vec::new()
            }
        }
    }

    /// Store id of the entry whose universal id is `uuid`
    pub async fn search_uuid(&self, uuid: &str) -> Option<String> {
        let wanted = uuid.to_lowercase();
        match self.search_hits(&wanted, None).await {
            Ok(results) => results
                .into_iter()
                .find(|r| r.uuid.to_lowercase() == wanted)
                .map(|r| r.id),
            Err(e) => {
                tracing::warn!(source = %self.source.url, uuid, error = %e, "uuid search failed");
                None
            }
        }
    }

    /// Resolve account locker rows to catalog entries, in bulk when the
    /// source supports it and one by one otherwise. Rows that cannot be
    /// resolved are left out.
    pub async fn fetch_apps_for_account(
        &self,
        entries: &[AccountLockerEntry],
        use_cache: bool,
    ) -> Vec<AccountApp> {
        if entries.is_empty() {
            return Vec::new();
        }
        if self.supports_bulk_fetch() {
            self.fetch_apps_in_bulk(entries).await
        } else {
            self.fetch_apps_one_by_one(entries, use_cache).await
        }
    }

    async fn fetch_apps_in_bulk(&self, entries: &[AccountLockerEntry]) -> Vec<AccountApp> {
        let url = self.url("v1/apps/bulk");
        let chunks = entries.chunks(BULK_CHUNK_SIZE);
        tracing::debug!(source = %self.source.url, chunks = chunks.len(), "bulk fetching account apps");

        let mut resolved = Vec::with_capacity(entries.len());
        for chunk in chunks {
            let body = BulkRequest {
                ids: chunk.iter().map(|e| e.appstore_id.as_str()).collect(),
            };
            match self.ctx.http.post_json::<_, BulkStoreResponse>(&url, &body).await {
                Ok(response) => {
                    for app in response.data {
                        if let Some(entry) = chunk.iter().find(|e| e.appstore_id == app.id) {
                            resolved.push(AccountApp {
                                entry: entry.clone(),
                                app,
                            });
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(source = %self.source.url, error = %e, "bulk fetch failed");
                }
            }
        }
        resolved
    }

    async fn fetch_apps_one_by_one(
        &self,
        entries: &[AccountLockerEntry],
        use_cache: bool,
    ) -> Vec<AccountApp> {
        let chunks = entries.chunks(self.ctx.fetch_concurrency);
        tracing::debug!(source = %self.source.url, chunks = chunks.len(), "fetching account apps one by one");

        let mut resolved = Vec::with_capacity(entries.len());
        for chunk in chunks {
            let fetched = join_all(chunk.iter().map(|entry| async move {
                let app = self
                    .fetch_app(&entry.appstore_id, None, use_cache)
                    .await?
                    .data
                    .into_iter()
                    .next()?;
                Some(AccountApp {
                    entry: entry.clone(),
                    app,
                })
            }))
            .await;
            resolved.extend(fetched.into_iter().flatten());
            if entries.len() > ONE_BY_ONE_THROTTLE_THRESHOLD {
                tokio::time::sleep(ONE_BY_ONE_THROTTLE).await;
            }
        }
        resolved
    }
}
