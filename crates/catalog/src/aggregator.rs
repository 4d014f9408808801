//! Fan-out across catalog sources
//!
//! Every request shape runs once per source, concurrently. The result keeps
//! one slot per source in registry order; a failing source leaves its slot
//! empty without affecting the others.

use crate::client::{CatalogContext, SourceClient};
use appstore_core::SourceRegistry;
use appstore_core::model::{AppStoreHome, AppType, StoreAppResponse, StoreCategory, StoreSearchResult, WatchPlatform};
use appstore_core::sources::{CatalogSource, SourceId};
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;

/// Multi-source request runner
#[derive(Debug, Clone)]
pub struct Aggregator {
    registry: Arc<SourceRegistry>,
    ctx: Arc<CatalogContext>,
}

impl Aggregator {
    /// Aggregate over the sources of `registry`
    #[must_use]
    pub const fn new(registry: Arc<SourceRegistry>, ctx: Arc<CatalogContext>) -> Self {
        Self { registry, ctx }
    }

    /// The source registry
    #[must_use]
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Shared catalog context
    #[must_use]
    pub fn context(&self) -> &CatalogContext {
        &self.ctx
    }

    /// Client bound to `source`
    #[must_use]
    pub fn client(&self, source: CatalogSource) -> SourceClient {
        SourceClient::new(source, Arc::clone(&self.ctx)).with_registry(Arc::clone(&self.registry))
    }

    /// Sources in registry order. A registry failure yields no sources.
    pub async fn sources(&self, enabled_only: bool) -> Vec<CatalogSource> {
        let listed = if enabled_only {
            self.registry.list_enabled().await
        } else {
            self.registry.list_all().await
        };
        listed.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not list catalog sources");
            Vec::new()
        })
    }

    /// Run `f` against every source concurrently, one slot per source
    pub async fn fetch_across_sources<T, F, Fut>(
        &self,
        enabled_only: bool,
        f: F,
    ) -> Vec<(CatalogSource, Option<T>)>
    where
        F: Fn(SourceClient) -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        let sources = self.sources(enabled_only).await;
        let results = join_all(sources.iter().cloned().map(|source| f(self.client(source)))).await;
        sources.into_iter().zip(results).collect()
    }

    /// Home bundle of every source
    pub async fn fetch_home(
        &self,
        app_type: AppType,
        hardware: Option<WatchPlatform>,
        enabled_only: bool,
        use_cache: bool,
    ) -> Vec<(CatalogSource, Option<AppStoreHome>)> {
        self.fetch_across_sources(enabled_only, |client| async move {
            client.fetch_home(app_type, hardware, use_cache).await
        })
        .await
    }

    /// Search every enabled source
    pub async fn search(
        &self,
        query: &str,
        app_type: Option<AppType>,
    ) -> Vec<(CatalogSource, Vec<StoreSearchResult>)> {
        self.fetch_across_sources(true, |client| async move {
            Some(client.search(query, app_type).await)
        })
        .await
        .into_iter()
        .map(|(source, results)| (source, results.unwrap_or_default()))
        .collect()
    }

    async fn source(&self, source_id: SourceId) -> Option<CatalogSource> {
        match self.registry.get(source_id).await {
            Ok(Some(source)) => Some(source),
            Ok(None) => {
                tracing::warn!(source_id, "unknown catalog source");
                None
            }
            Err(e) => {
                tracing::warn!(source_id, error = %e, "could not look up catalog source");
                None
            }
        }
    }

    /// One application from one source
    pub async fn fetch_app(
        &self,
        source_id: SourceId,
        id: &str,
        hardware: Option<WatchPlatform>,
        use_cache: bool,
    ) -> Option<StoreAppResponse> {
        let source = self.source(source_id).await?;
        self.client(source).fetch_app(id, hardware, use_cache).await
    }

    /// Categories of one source, falling back to the built-in defaults
    pub async fn fetch_categories(
        &self,
        app_type: AppType,
        source_id: SourceId,
        use_cache: bool,
    ) -> Vec<StoreCategory> {
        match self.source(source_id).await {
            Some(source) => self.client(source).fetch_categories(app_type, use_cache).await,
            None => crate::default_categories(app_type),
        }
    }
}
