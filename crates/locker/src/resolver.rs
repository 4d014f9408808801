//! Locker resolution
//!
//! [`LockerResolver::resolve_locker`] builds the locker screen for one app
//! type. Local entries are authoritative; account rows missing locally are
//! resolved through the catalog they were installed from; an optional store
//! search adds catalog-only hits. Everything is reconciled by universal id
//! and then filtered by compatibility.

use crate::entry::LockerEntry;
use crate::reconcile::reconcile;
use crate::store::{AccountLocker, LockerStore};
use appstore_catalog::{Aggregator, default_categories};
use appstore_core::Config;
use appstore_core::model::{
    AccountLockerEntry, AppType, ClientPlatform, LocalLockerEntry, StoreCategory, WatchPlatform,
};
use appstore_core::sources::{CatalogSource, SourceId};
use futures::future::join_all;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// What to resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockerQuery {
    pub app_type: AppType,
    /// Case-insensitive match on title or developer; empty matches all
    pub search_query: String,
    /// Watch the view is built for
    pub target: WatchPlatform,
    /// Keep entries the target cannot run
    pub show_incompatible: bool,
    /// Keep entries that only run scaled
    pub show_scaled: bool,
    /// Add catalog search hits for a non-empty query
    pub include_store_search: bool,
}

impl LockerQuery {
    /// Every compatible entry of `app_type`, scaled ones included
    #[must_use]
    pub const fn new(app_type: AppType, target: WatchPlatform) -> Self {
        Self {
            app_type,
            search_query: String::new(),
            target,
            show_incompatible: false,
            show_scaled: true,
            include_store_search: false,
        }
    }

    #[must_use]
    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
        self
    }

    #[must_use]
    pub const fn with_incompatible(mut self, show: bool) -> Self {
        self.show_incompatible = show;
        self
    }

    #[must_use]
    pub const fn with_scaled(mut self, show: bool) -> Self {
        self.show_scaled = show;
        self
    }

    #[must_use]
    pub const fn with_store_search(mut self, include: bool) -> Self {
        self.include_store_search = include;
        self
    }

    fn matches(&self, title: &str, developer: &str) -> bool {
        if self.search_query.is_empty() {
            return true;
        }
        let query = self.search_query.to_lowercase();
        title.to_lowercase().contains(&query) || developer.to_lowercase().contains(&query)
    }

    const fn keeps(&self, entry: &LockerEntry) -> bool {
        (self.show_incompatible || entry.is_compatible())
            && (self.show_scaled || entry.is_natively_compatible())
    }
}

/// Builds locker views from the local locker, the account locker and the
/// catalogs
pub struct LockerResolver {
    aggregator: Arc<Aggregator>,
    locker: Arc<dyn LockerStore>,
    account: Option<Arc<dyn AccountLocker>>,
    load_limit: usize,
    use_native_app_store: bool,
    use_cache: bool,
}

impl std::fmt::Debug for LockerResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockerResolver")
            .field("has_account", &self.account.is_some())
            .field("load_limit", &self.load_limit)
            .field("use_native_app_store", &self.use_native_app_store)
            .field("use_cache", &self.use_cache)
            .finish_non_exhaustive()
    }
}

impl LockerResolver {
    /// Resolver over `locker` with the configured defaults
    #[must_use]
    pub fn new(aggregator: Arc<Aggregator>, locker: Arc<dyn LockerStore>, config: &Config) -> Self {
        Self {
            aggregator,
            locker,
            account: None,
            load_limit: config.locker_load_limit(),
            use_native_app_store: config.use_native_app_store(),
            use_cache: true,
        }
    }

    /// Consult `account` for rows missing from the local locker
    #[must_use]
    pub fn with_account_locker(mut self, account: Arc<dyn AccountLocker>) -> Self {
        self.account = Some(account);
        self
    }

    /// Bypass the disk cache for catalog lookups
    #[must_use]
    pub const fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    #[must_use]
    pub const fn with_load_limit(mut self, limit: usize) -> Self {
        self.load_limit = limit;
        self
    }

    fn client_platform(&self) -> ClientPlatform {
        self.aggregator.context().client_platform()
    }

    /// Every universal id in the local locker, for
    /// [`LockerEntry::in_collection`]. Empty when the locker is unavailable.
    pub async fn collection_uuids(&self) -> HashSet<Uuid> {
        match self.locker.all_uuids().await {
            Ok(ids) => ids.into_iter().collect(),
            Err(e) => {
                tracing::warn!(error = %e, "local locker unavailable");
                HashSet::new()
            }
        }
    }

    /// Resolve the locker view for `query`
    pub async fn resolve_locker(&self, query: &LockerQuery) -> Vec<LockerEntry> {
        let local = match self
            .locker
            .entries(query.app_type, &query.search_query, self.load_limit)
            .await
        {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "local locker unavailable, showing catalog entries only");
                Vec::new()
            }
        };
        let sources = self.aggregator.sources(false).await;
        let account_rows = self.account_rows().await;
        let mut categories = CategoryMemo::default();

        let mut local_views = Vec::with_capacity(local.len());
        for entry in &local {
            let source = account_rows
                .iter()
                .find(|row| row.uuid == entry.id())
                .and_then(|row| source_for_url(&sources, &row.appstore_source));
            let source_categories = categories.get(&self.aggregator, source, query.app_type).await;
            local_views.push(LockerEntry::from_local(
                entry,
                query.target,
                self.client_platform(),
                source.cloned(),
                source_categories,
            ));
        }

        let mut store_views = self
            .account_views(query, &local, &account_rows, &sources, &mut categories)
            .await;
        if query.include_store_search && !query.search_query.is_empty() {
            store_views.extend(self.search_views(query).await);
        }

        let resolved = reconcile(local_views, store_views);
        let total = resolved.len();
        let kept: Vec<_> = resolved.into_iter().filter(|e| query.keeps(e)).collect();
        tracing::debug!(
            app_type = %query.app_type,
            local = local.len(),
            total,
            kept = kept.len(),
            "resolved locker"
        );
        kept
    }

    async fn account_rows(&self) -> Vec<AccountLockerEntry> {
        if !self.use_native_app_store {
            return Vec::new();
        }
        let Some(account) = &self.account else {
            return Vec::new();
        };
        match account.read_locker().await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(error = %e, "account locker unavailable");
                Vec::new()
            }
        }
    }

    /// Account rows not present locally, resolved through their catalog
    async fn account_views(
        &self,
        query: &LockerQuery,
        local: &[LocalLockerEntry],
        account_rows: &[AccountLockerEntry],
        sources: &[CatalogSource],
        categories: &mut CategoryMemo,
    ) -> Vec<LockerEntry> {
        if account_rows.is_empty() {
            return Vec::new();
        }
        let mut present = self.collection_uuids().await;
        present.extend(local.iter().map(LocalLockerEntry::id));

        let mut by_source: IndexMap<SourceId, (&CatalogSource, Vec<AccountLockerEntry>)> =
            IndexMap::new();
        for row in account_rows.iter().filter(|row| !present.contains(&row.uuid)) {
            match source_for_url(sources, &row.appstore_source) {
                Some(source) => by_source
                    .entry(source.id)
                    .or_insert_with(|| (source, Vec::new()))
                    .1
                    .push(row.clone()),
                None => {
                    tracing::debug!(uuid = %row.uuid, url = %row.appstore_source, "account row has no known source");
                }
            }
        }

        let fetched = join_all(by_source.values().map(|(source, rows)| {
            let client = self.aggregator.client((*source).clone());
            async move { client.fetch_apps_for_account(rows, self.use_cache).await }
        }))
        .await;

        let mut views = Vec::new();
        for ((source, _), apps) in by_source.values().zip(fetched) {
            let source_categories = categories
                .get(&self.aggregator, Some(*source), query.app_type)
                .await;
            views.extend(apps.iter().filter_map(|resolved| {
                LockerEntry::from_store_app(
                    &resolved.app,
                    query.target,
                    self.client_platform(),
                    source,
                    source_categories,
                )
                .filter(|e| e.app_type == query.app_type && query.matches(&e.title, &e.developer_name))
            }));
        }
        views
    }

    async fn search_views(&self, query: &LockerQuery) -> Vec<LockerEntry> {
        self.aggregator
            .search(&query.search_query, Some(query.app_type))
            .await
            .iter()
            .flat_map(|(source, hits)| {
                hits.iter().filter_map(move |hit| {
                    LockerEntry::from_search_result(hit, query.target, self.client_platform(), source)
                })
            })
            .filter(|e| e.app_type == query.app_type)
            .collect()
    }
}

fn source_for_url<'a>(sources: &'a [CatalogSource], url: &str) -> Option<&'a CatalogSource> {
    sources.iter().find(|s| s.url == url)
}

/// Category lists looked up once per source during a resolution
#[derive(Default)]
struct CategoryMemo {
    by_source: HashMap<Option<SourceId>, Vec<StoreCategory>>,
}

impl CategoryMemo {
    async fn get(
        &mut self,
        aggregator: &Aggregator,
        source: Option<&CatalogSource>,
        app_type: AppType,
    ) -> &[StoreCategory] {
        let key = source.map(|s| s.id);
        if !self.by_source.contains_key(&key) {
            let categories = match source {
                Some(source) => {
                    aggregator
                        .client(source.clone())
                        .cached_categories_or_defaults(Some(app_type))
                        .await
                }
                None => default_categories(app_type),
            };
            self.by_source.insert(key, categories);
        }
        self.by_source.get(&key).map_or(&[], Vec::as_slice)
    }
}
