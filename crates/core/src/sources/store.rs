//! Persisted source and collection tables
//!
//! The registry talks to persistence through [`SourceStore`] and
//! [`CollectionStore`]. [`MemoryStore`] keeps rows in memory;
//! [`JsonFileStore`] additionally writes them to a JSON file after every
//! mutation.

use super::model::{AppstoreCollection, CatalogSource, NewCatalogSource, SourceId};
use crate::model::AppType;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Source table operations
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// All rows in insertion order
    async fn get_all_sources(&self) -> Result<Vec<CatalogSource>>;

    /// Insert a row; fails with a conflict when the URL exists
    async fn insert_source(&self, source: NewCatalogSource) -> Result<SourceId>;

    /// Delete a row and its collections. Unknown ids are ignored.
    async fn delete_source(&self, id: SourceId) -> Result<()>;

    /// Toggle a row
    async fn set_source_enabled(&self, id: SourceId, enabled: bool) -> Result<()>;

    /// Look up a row
    async fn get_source_by_id(&self, id: SourceId) -> Result<Option<CatalogSource>>;
}

/// Collection table operations
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// All rows
    async fn get_all_collections(&self) -> Result<Vec<AppstoreCollection>>;

    /// Insert, or replace the row with the same unique key. Returns the row id.
    async fn upsert_collection(&self, collection: AppstoreCollection) -> Result<i64>;

    /// Delete by id. Unknown ids are ignored.
    async fn delete_collection(&self, id: i64) -> Result<()>;

    /// Look up by unique key
    async fn get_collection(
        &self,
        source_id: SourceId,
        slug: &str,
        app_type: AppType,
    ) -> Result<Option<AppstoreCollection>>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Tables {
    #[serde(default)]
    sources: Vec<CatalogSource>,
    #[serde(default)]
    collections: Vec<AppstoreCollection>,
    #[serde(default)]
    last_source_id: SourceId,
    #[serde(default)]
    last_collection_id: i64,
}

impl Tables {
    fn insert_source(&mut self, source: NewCatalogSource) -> Result<SourceId> {
        if self.sources.iter().any(|s| s.url == source.url) {
            return Err(Error::conflict("source", source.url));
        }
        self.last_source_id += 1;
        let id = self.last_source_id;
        self.sources.push(source.with_id(id));
        Ok(id)
    }

    fn delete_source(&mut self, id: SourceId) {
        self.sources.retain(|s| s.id != id);
        self.collections.retain(|c| c.source_id != id);
    }

    fn set_source_enabled(&mut self, id: SourceId, enabled: bool) -> Result<()> {
        let source = self
            .sources
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::not_found("source", id))?;
        source.enabled = enabled;
        Ok(())
    }

    fn upsert_collection(&mut self, mut collection: AppstoreCollection) -> Result<i64> {
        if !self.sources.iter().any(|s| s.id == collection.source_id) {
            return Err(Error::not_found("source", collection.source_id));
        }
        if let Some(existing) = self
            .collections
            .iter_mut()
            .find(|c| c.same_key(&collection))
        {
            collection.id = existing.id;
            *existing = collection;
            return Ok(existing.id);
        }
        self.last_collection_id += 1;
        collection.id = self.last_collection_id;
        let id = collection.id;
        self.collections.push(collection);
        Ok(id)
    }

    fn delete_collection(&mut self, id: i64) {
        self.collections.retain(|c| c.id != id);
    }
}

/// In-memory tables
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SourceStore for MemoryStore {
    async fn get_all_sources(&self) -> Result<Vec<CatalogSource>> {
        Ok(self.tables.read().await.sources.clone())
    }

    async fn insert_source(&self, source: NewCatalogSource) -> Result<SourceId> {
        self.tables.write().await.insert_source(source)
    }

    async fn delete_source(&self, id: SourceId) -> Result<()> {
        self.tables.write().await.delete_source(id);
        Ok(())
    }

    async fn set_source_enabled(&self, id: SourceId, enabled: bool) -> Result<()> {
        self.tables.write().await.set_source_enabled(id, enabled)
    }

    async fn get_source_by_id(&self, id: SourceId) -> Result<Option<CatalogSource>> {
        Ok(self
            .tables
            .read()
            .await
            .sources
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn get_all_collections(&self) -> Result<Vec<AppstoreCollection>> {
        Ok(self.tables.read().await.collections.clone())
    }

    async fn upsert_collection(&self, collection: AppstoreCollection) -> Result<i64> {
        self.tables.write().await.upsert_collection(collection)
    }

    async fn delete_collection(&self, id: i64) -> Result<()> {
        self.tables.write().await.delete_collection(id);
        Ok(())
    }

    async fn get_collection(
        &self,
        source_id: SourceId,
        slug: &str,
        app_type: AppType,
    ) -> Result<Option<AppstoreCollection>> {
        Ok(find_collection(
            &self.tables.read().await.collections,
            source_id,
            slug,
            app_type,
        ))
    }
}

fn find_collection(
    collections: &[AppstoreCollection],
    source_id: SourceId,
    slug: &str,
    app_type: AppType,
) -> Option<AppstoreCollection> {
    collections
        .iter()
        .find(|c| c.source_id == source_id && c.slug == slug && c.app_type == app_type)
        .cloned()
}

/// Tables persisted to a JSON file.
///
/// The whole file is rewritten after each mutation (temp file + rename).
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    tables: RwLock<Tables>,
}

impl JsonFileStore {
    /// File name used under a data directory
    pub const FILE_NAME: &'static str = "sources.json";

    /// Open `path`, starting empty when the file does not exist.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tables = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                Error::serialization(format!("{}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Tables::default(),
            Err(e) => return Err(Error::io(e, &path, "read")),
        };
        Ok(Self {
            path,
            tables: RwLock::new(tables),
        })
    }

    /// Open `<dir>/sources.json`
    pub async fn open_in(dir: &Path) -> Result<Self> {
        Self::open(dir.join(Self::FILE_NAME)).await
    }

    /// Backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, tables: &Tables) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io(e, parent, "create_dir_all"))?;
        }
        let bytes = serde_json::to_vec_pretty(tables)
            .map_err(|e| Error::serialization(e.to_string()))?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &bytes)
            .await
            .map_err(|e| Error::io(e, &tmp_path, "write"))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| Error::io(e, &self.path, "rename"))
    }

    async fn mutate<T: Send>(&self, f: impl FnOnce(&mut Tables) -> Result<T> + Send) -> Result<T> {
        let mut tables = self.tables.write().await;
        let mut next = tables.clone();
        let out = f(&mut next)?;
        self.persist(&next).await?;
        *tables = next;
        Ok(out)
    }
}

#[async_trait]
impl SourceStore for JsonFileStore {
    async fn get_all_sources(&self) -> Result<Vec<CatalogSource>> {
        Ok(self.tables.read().await.sources.clone())
    }

    async fn insert_source(&self, source: NewCatalogSource) -> Result<SourceId> {
        self.mutate(|t| t.insert_source(source)).await
    }

    async fn delete_source(&self, id: SourceId) -> Result<()> {
        self.mutate(|t| {
            t.delete_source(id);
            Ok(())
        })
        .await
    }

    async fn set_source_enabled(&self, id: SourceId, enabled: bool) -> Result<()> {
        self.mutate(|t| t.set_source_enabled(id, enabled)).await
    }

    async fn get_source_by_id(&self, id: SourceId) -> Result<Option<CatalogSource>> {
        Ok(self
            .tables
            .read()
            .await
            .sources
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }
}

#[async_trait]
impl CollectionStore for JsonFileStore {
    async fn get_all_collections(&self) -> Result<Vec<AppstoreCollection>> {
        Ok(self.tables.read().await.collections.clone())
    }

    async fn upsert_collection(&self, collection: AppstoreCollection) -> Result<i64> {
        self.mutate(|t| t.upsert_collection(collection)).await
    }

    async fn delete_collection(&self, id: i64) -> Result<()> {
        self.mutate(|t| {
            t.delete_collection(id);
            Ok(())
        })
        .await
    }

    async fn get_collection(
        &self,
        source_id: SourceId,
        slug: &str,
        app_type: AppType,
    ) -> Result<Option<AppstoreCollection>> {
        Ok(find_collection(
            &self.tables.read().await.collections,
            source_id,
            slug,
            app_type,
        ))
    }
}
