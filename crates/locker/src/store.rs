//! Locker storage seams
//!
//! The local locker is owned by the device sync layer and the account
//! locker by the account backend; this crate only reads them.

use crate::{Error, Result};
use appstore_core::model::{AccountLockerEntry, AppType, LocalLockerEntry};
use async_trait::async_trait;
use std::path::Path;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Read access to the local locker
#[async_trait]
pub trait LockerStore: Send + Sync {
    /// Entries of `app_type` matching `search_query` (empty matches all),
    /// in locker order, at most `limit`
    async fn entries(
        &self,
        app_type: AppType,
        search_query: &str,
        limit: usize,
    ) -> Result<Vec<LocalLockerEntry>>;

    /// Universal id of every entry regardless of type
    async fn all_uuids(&self) -> Result<Vec<Uuid>>;
}

/// Read access to the remote account locker
#[async_trait]
pub trait AccountLocker: Send + Sync {
    /// Every row of the account locker
    async fn read_locker(&self) -> Result<Vec<AccountLockerEntry>>;
}

fn matches_query(entry: &LocalLockerEntry, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let query = query.to_lowercase();
    let properties = entry.properties();
    properties.title.to_lowercase().contains(&query)
        || properties.developer_name.to_lowercase().contains(&query)
}

async fn read_json_array<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::io(e, path, "read"))?;
    serde_json::from_slice(&bytes).map_err(|e| Error::invalid(path, e.to_string()))
}

/// In-memory local locker
#[derive(Debug, Default)]
pub struct MemoryLocker {
    entries: RwLock<Vec<LocalLockerEntry>>,
}

impl MemoryLocker {
    /// Locker holding `entries`
    #[must_use]
    pub fn new(entries: Vec<LocalLockerEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Load a JSON array of entries
    pub async fn from_json_file(path: &Path) -> Result<Self> {
        Ok(Self::new(read_json_array(path).await?))
    }

    /// Add or replace an entry
    pub async fn upsert(&self, entry: LocalLockerEntry) {
        let mut entries = self.entries.write().await;
        match entries.iter_mut().find(|e| e.id() == entry.id()) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
    }
}

#[async_trait]
impl LockerStore for MemoryLocker {
    async fn entries(
        &self,
        app_type: AppType,
        search_query: &str,
        limit: usize,
    ) -> Result<Vec<LocalLockerEntry>> {
        let entries = self.entries.read().await;
        let mut matching: Vec<_> = entries
            .iter()
            .filter(|e| e.properties().app_type == app_type && matches_query(e, search_query))
            .cloned()
            .collect();
        matching.sort_by_key(|e| e.properties().order);
        matching.truncate(limit);
        Ok(matching)
    }

    async fn all_uuids(&self) -> Result<Vec<Uuid>> {
        Ok(self.entries.read().await.iter().map(LocalLockerEntry::id).collect())
    }
}

/// In-memory account locker
#[derive(Debug, Default, Clone)]
pub struct MemoryAccountLocker {
    entries: Vec<AccountLockerEntry>,
}

impl MemoryAccountLocker {
    /// Account locker holding `entries`
    #[must_use]
    pub const fn new(entries: Vec<AccountLockerEntry>) -> Self {
        Self { entries }
    }

    /// Load a JSON array of rows
    pub async fn from_json_file(path: &Path) -> Result<Self> {
        Ok(Self::new(read_json_array(path).await?))
    }
}

#[async_trait]
impl AccountLocker for MemoryAccountLocker {
    async fn read_locker(&self) -> Result<Vec<AccountLockerEntry>> {
        Ok(self.entries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appstore_core::model::{AppProperties, SyncState};

    fn normal(title: &str, app_type: AppType, order: i32) -> LocalLockerEntry {
        LocalLockerEntry::Normal {
            properties: AppProperties {
                id: Uuid::new_v4(),
                app_type,
                title: title.into(),
                developer_name: "Acme".into(),
                platforms: Vec::new(),
                version: Some("1.0".into()),
                hearts: None,
                category: None,
                order,
                store_id: None,
                developer_id: None,
                source_link: None,
            },
            sideloaded: false,
            configurable: false,
            sync_state: SyncState::Synced,
        }
    }

    #[tokio::test]
    async fn filters_sorts_and_limits() {
        let locker = MemoryLocker::new(vec![
            normal("Weather", AppType::Watchapp, 3),
            normal("Timer", AppType::Watchapp, 1),
            normal("Tic Tock", AppType::Watchface, 0),
            normal("Stopwatch", AppType::Watchapp, 2),
        ]);
        let apps = locker.entries(AppType::Watchapp, "", 2).await.unwrap();
        let titles: Vec<_> = apps.iter().map(|e| e.properties().title.as_str()).collect();
        assert_eq!(titles, ["Timer", "Stopwatch"]);

        let found = locker.entries(AppType::Watchapp, "weath", 10).await.unwrap();
        assert_eq!(found.len(), 1);
        let by_developer = locker.entries(AppType::Watchface, "ACME", 10).await.unwrap();
        assert_eq!(by_developer.len(), 1);
        assert_eq!(locker.all_uuids().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let locker = MemoryLocker::default();
        let entry = normal("Timer", AppType::Watchapp, 0);
        locker.upsert(entry.clone()).await;
        let mut renamed = entry;
        if let LocalLockerEntry::Normal { properties, .. } = &mut renamed {
            properties.title = "Countdown".into();
        }
        locker.upsert(renamed).await;
        let all = locker.entries(AppType::Watchapp, "", 10).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].properties().title, "Countdown");
    }

    #[tokio::test]
    async fn loads_json_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("locker.json");
        let entries = vec![normal("Timer", AppType::Watchapp, 0)];
        std::fs::write(&path, serde_json::to_vec(&entries).unwrap()).unwrap();
        let locker = MemoryLocker::from_json_file(&path).await.unwrap();
        assert_eq!(locker.all_uuids().await.unwrap(), vec![entries[0].id()]);

        std::fs::write(&path, b"{}").unwrap();
        assert!(matches!(
            MemoryLocker::from_json_file(&path).await,
            Err(Error::Invalid { .. })
        ));
        assert!(matches!(
            MemoryAccountLocker::from_json_file(&tmp.path().join("missing.json")).await,
            Err(Error::Io { .. })
        ));
    }
}
