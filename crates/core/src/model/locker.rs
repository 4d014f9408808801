//! Locally synced locker entries and remote-account locker rows

use super::platform::{AppType, WatchPlatform};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;

static APP_VERSION: LazyLock<Option<regex::Regex>> =
    LazyLock::new(|| regex::Regex::new(r"(\d+)\.(\d+)(:?-.*)?").ok());

/// Whether `version` looks like `major.minor[-suffix]`
#[must_use]
pub fn is_valid_app_version(version: &str) -> bool {
    APP_VERSION
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(version))
}

/// Per-family assets of a locally stored app
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppPlatform {
    pub watch_platform: WatchPlatform,
    #[serde(default)]
    pub screenshot_image_url: Option<String>,
    #[serde(default)]
    pub list_image_url: Option<String>,
    #[serde(default)]
    pub icon_image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl AppPlatform {
    /// A platform entry with no assets
    #[must_use]
    pub const fn bare(watch_platform: WatchPlatform) -> Self {
        Self {
            watch_platform,
            screenshot_image_url: None,
            list_image_url: None,
            icon_image_url: None,
            description: None,
        }
    }
}

/// Properties shared by every local locker entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppProperties {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub app_type: AppType,
    pub title: String,
    pub developer_name: String,
    #[serde(default)]
    pub platforms: Vec<AppPlatform>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub hearts: Option<i32>,
    #[serde(default)]
    pub category: Option<String>,
    /// Position in the user's locker
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub store_id: Option<String>,
    #[serde(default)]
    pub developer_id: Option<String>,
    #[serde(default)]
    pub source_link: Option<String>,
}

/// Per-entry sync lifecycle, driven by the device sync layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncState {
    #[default]
    NotSynced,
    Syncing,
    Synced,
}

/// Built-in firmware apps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SystemApp {
    Settings,
    Music,
    Notifications,
    Alarms,
    Workout,
    Watchfaces,
    Health,
    Weather,
    Tictoc,
    Kickstart,
}

/// An entry of the local locker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum LocalLockerEntry {
    /// Installed or owned app
    Normal {
        properties: AppProperties,
        #[serde(default)]
        sideloaded: bool,
        #[serde(default)]
        configurable: bool,
        #[serde(default)]
        sync_state: SyncState,
    },
    /// Firmware built-in
    System {
        properties: AppProperties,
        system_app: SystemApp,
    },
}

impl LocalLockerEntry {
    /// Shared properties
    #[must_use]
    pub const fn properties(&self) -> &AppProperties {
        match self {
            Self::Normal { properties, .. } | Self::System { properties, .. } => properties,
        }
    }

    /// Universal id
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.properties().id
    }

    /// System entries are always on the watch
    #[must_use]
    pub fn is_synced(&self) -> bool {
        match self {
            Self::Normal { sync_state, .. } => *sync_state == SyncState::Synced,
            Self::System { .. } => true,
        }
    }

    /// Best binary for `target`: an exact match, else any variant the target
    /// can run. Normal entries with a malformed version never match.
    #[must_use]
    pub fn find_compatible_platform(&self, target: WatchPlatform) -> Option<&AppPlatform> {
        let properties = self.properties();
        if matches!(self, Self::Normal { .. })
            && !properties
                .version
                .as_deref()
                .is_some_and(is_valid_app_version)
        {
            tracing::debug!(
                id = %properties.id,
                version = ?properties.version,
                "invalid app version, no compatible platform"
            );
            return None;
        }
        properties
            .platforms
            .iter()
            .find(|p| p.watch_platform == target)
            .or_else(|| {
                properties
                    .platforms
                    .iter()
                    .find(|p| target.can_run(p.watch_platform))
            })
    }
}

/// A row of the remote account locker
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountLockerEntry {
    pub uuid: Uuid,
    /// Store identity on the owning source
    pub appstore_id: String,
    /// Base URL of the owning source
    pub appstore_source: String,
    #[serde(default)]
    pub timeline_token: Option<String>,
}
