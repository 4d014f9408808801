//! Unified locker view entries
//!
//! A [`LockerEntry`] is what the locker and store screens render, whatever
//! its origin. The origin and its origin-specific data live in
//! [`Provenance`].

use appstore_core::compat::{CompatibilityResult, resolve};
use appstore_core::model::{
    AppPlatform, AppType, ClientPlatform, LocalLockerEntry, StoreApplication, StoreCategory,
    StoreCompanionApp, StoreSearchResult, SystemApp, WatchPlatform,
};
use appstore_core::sources::CatalogSource;
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

/// Where an entry comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Provenance {
    /// Synced or owned locally
    Locker {
        /// Installed from a file rather than a catalog
        sideloaded: bool,
        /// Has a settings page
        configurable: bool,
        /// Present on the watch
        synced: bool,
        /// Position in the locker
        order: i32,
    },
    /// Known only from a catalog
    Store {
        /// Catalog that listed it
        source: CatalogSource,
        /// Full catalog entry; absent for search hits
        store_app: Option<Box<StoreApplication>>,
        header_image_url: Option<String>,
        screenshot_urls: Vec<String>,
    },
    /// Firmware built-in
    System {
        /// Which built-in
        app: SystemApp,
        /// Position in the locker
        order: i32,
    },
}

impl Provenance {
    /// Locker or System
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Locker { .. } | Self::System { .. })
    }

    /// Locker order, for local provenances
    #[must_use]
    pub const fn order(&self) -> Option<i32> {
        match self {
            Self::Locker { order, .. } | Self::System { order, .. } => Some(*order),
            Self::Store { .. } => None,
        }
    }
}

/// One application or watchface in a resolved view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockerEntry {
    pub uuid: Uuid,
    pub title: String,
    pub developer_name: String,
    pub app_type: AppType,
    pub provenance: Provenance,
    pub category: Option<String>,
    pub category_slug: Option<String>,
    pub version: Option<String>,
    pub list_image_url: Option<String>,
    pub screenshot_image_url: Option<String>,
    pub description: Option<String>,
    pub hearts: Option<i32>,
    pub android_companion: Option<StoreCompanionApp>,
    pub compatibility: CompatibilityResult,
    pub store_id: Option<String>,
    pub developer_id: Option<String>,
    pub source_link: Option<String>,
    /// Catalog the entry is linked to, if known
    pub appstore_source: Option<CatalogSource>,
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn platform_field(
    compatible: Option<&AppPlatform>,
    any: Option<&AppPlatform>,
    field: impl Fn(&AppPlatform) -> Option<&String>,
) -> Option<String> {
    compatible
        .and_then(|p| field(p))
        .or_else(|| any.and_then(|p| field(p)))
        .cloned()
}

impl LockerEntry {
    /// View of a local locker entry. Images and description come from the
    /// best platform for `target`, else the first platform listed.
    #[must_use]
    pub fn from_local(
        entry: &LocalLockerEntry,
        target: WatchPlatform,
        client: ClientPlatform,
        appstore_source: Option<CatalogSource>,
        categories: &[StoreCategory],
    ) -> Self {
        let properties = entry.properties();
        let compatible = entry.find_compatible_platform(target);
        let any = properties.platforms.first();

        let (provenance, hearts) = match entry {
            LocalLockerEntry::Normal {
                sideloaded,
                configurable,
                ..
            } => (
                Provenance::Locker {
                    sideloaded: *sideloaded,
                    configurable: *configurable,
                    synced: entry.is_synced(),
                    order: properties.order,
                },
                properties.hearts,
            ),
            LocalLockerEntry::System { system_app, .. } => (
                Provenance::System {
                    app: *system_app,
                    order: properties.order,
                },
                None,
            ),
        };

        Self {
            uuid: properties.id,
            title: properties.title.clone(),
            developer_name: properties.developer_name.clone(),
            app_type: properties.app_type,
            provenance,
            category: properties.category.clone(),
            category_slug: properties.category.as_ref().and_then(|name| {
                categories
                    .iter()
                    .find(|c| &c.name == name)
                    .map(|c| c.slug.clone())
            }),
            version: properties.version.clone(),
            list_image_url: platform_field(compatible, any, |p| p.list_image_url.as_ref()),
            screenshot_image_url: platform_field(compatible, any, |p| p.screenshot_image_url.as_ref()),
            description: platform_field(compatible, any, |p| p.description.as_ref()),
            hearts,
            android_companion: None,
            compatibility: resolve(entry, target, client),
            store_id: properties.store_id.clone(),
            developer_id: properties.developer_id.clone(),
            source_link: properties.source_link.clone(),
            appstore_source,
        }
    }

    /// View of a catalog entry. `None` for an unknown type, a missing
    /// release, or an unusable universal id.
    #[must_use]
    pub fn from_store_app(
        app: &StoreApplication,
        target: WatchPlatform,
        client: ClientPlatform,
        source: &CatalogSource,
        categories: &[StoreCategory],
    ) -> Option<Self> {
        let Some(app_type) = app.app_type() else {
            tracing::warn!(id = %app.id, kind = %app.kind, "unknown store app type");
            return None;
        };
        let Some(release) = &app.latest_release else {
            tracing::warn!(id = %app.id, "store app has no latest release");
            return None;
        };
        let uuid = app.parsed_uuid()?;

        Some(Self {
            uuid,
            title: app.title.clone(),
            developer_name: app.author.clone(),
            app_type,
            provenance: Provenance::Store {
                source: source.clone(),
                store_app: Some(Box::new(app.clone())),
                header_image_url: app.header_image_url().map(str::to_string),
                screenshot_urls: app.screenshot_urls(),
            },
            category: non_empty(&app.category),
            category_slug: categories
                .iter()
                .find(|c| c.id == app.category_id)
                .map(|c| c.slug.clone()),
            version: non_empty(&release.version),
            list_image_url: app.list_image_url().map(str::to_string),
            screenshot_image_url: app.screenshot_urls().into_iter().next(),
            description: non_empty(&app.description),
            hearts: Some(app.hearts),
            android_companion: app.companions.android.clone(),
            compatibility: resolve(app, target, client),
            store_id: non_empty(&app.id),
            developer_id: non_empty(&app.developer_id),
            source_link: app.source.clone(),
            appstore_source: Some(source.clone()),
        })
    }

    /// View of a search hit. Search hits carry no per-binary detail and are
    /// always natively compatible.
    #[must_use]
    pub fn from_search_result(
        result: &StoreSearchResult,
        target: WatchPlatform,
        client: ClientPlatform,
        source: &CatalogSource,
    ) -> Option<Self> {
        let Some(app_type) = result.app_type() else {
            tracing::warn!(id = %result.id, kind = %result.kind, "unknown search hit type");
            return None;
        };
        let uuid = result.parsed_uuid()?;

        Some(Self {
            uuid,
            title: result.title.clone(),
            developer_name: result.author.clone(),
            app_type,
            provenance: Provenance::Store {
                source: source.clone(),
                store_app: None,
                header_image_url: None,
                screenshot_urls: Vec::new(),
            },
            category: non_empty(&result.category),
            category_slug: None,
            version: None,
            list_image_url: non_empty(&result.list_image),
            screenshot_image_url: result.screenshot_images.first().cloned(),
            description: non_empty(&result.description),
            hearts: Some(result.hearts),
            android_companion: None,
            compatibility: resolve(result, target, client),
            store_id: non_empty(&result.id),
            developer_id: None,
            source_link: None,
            appstore_source: Some(source.clone()),
        })
    }

    /// Device family can run it
    #[must_use]
    pub const fn is_compatible(&self) -> bool {
        self.compatibility.is_compatible
    }

    /// Runs without scaling
    #[must_use]
    pub const fn is_natively_compatible(&self) -> bool {
        self.compatibility.is_natively_compatible
    }

    /// On the watch. Store entries never are; system entries always are.
    #[must_use]
    pub const fn is_synced(&self) -> bool {
        match &self.provenance {
            Provenance::Locker { synced, .. } => *synced,
            Provenance::Store { .. } => false,
            Provenance::System { .. } => true,
        }
    }

    /// In the user's collection, given every uuid of the local locker
    #[must_use]
    pub fn in_collection(&self, locker_uuids: &HashSet<Uuid>) -> bool {
        match self.provenance {
            Provenance::Locker { .. } | Provenance::System { .. } => true,
            Provenance::Store { .. } => locker_uuids.contains(&self.uuid),
        }
    }

    /// Can be launched on the watch
    #[must_use]
    pub const fn can_start(&self) -> bool {
        !matches!(self.provenance, Provenance::Store { .. })
    }

    /// Listed on the main locker screen. System apps are not, system
    /// watchfaces are.
    #[must_use]
    pub fn show_on_main_screen(&self) -> bool {
        match self.provenance {
            Provenance::Locker { .. } | Provenance::Store { .. } => true,
            Provenance::System { .. } => self.app_type == AppType::Watchface,
        }
    }

    /// Fill optional display fields this entry lacks from `other`
    pub fn backfill_from(&mut self, other: &Self) {
        fn fill<T: Clone>(slot: &mut Option<T>, from: Option<&T>) {
            if slot.is_none() {
                *slot = from.cloned();
            }
        }
        fill(&mut self.category, other.category.as_ref());
        fill(&mut self.category_slug, other.category_slug.as_ref());
        fill(&mut self.version, other.version.as_ref());
        fill(&mut self.list_image_url, other.list_image_url.as_ref());
        fill(&mut self.screenshot_image_url, other.screenshot_image_url.as_ref());
        fill(&mut self.description, other.description.as_ref());
        fill(&mut self.hearts, other.hearts.as_ref());
        fill(&mut self.android_companion, other.android_companion.as_ref());
        fill(&mut self.store_id, other.store_id.as_ref());
        fill(&mut self.developer_id, other.developer_id.as_ref());
        fill(&mut self.source_link, other.source_link.as_ref());
        fill(&mut self.appstore_source, other.appstore_source.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appstore_core::model::{
        AppProperties, Compatibility, StoreHardwarePlatform, StoreLatestRelease,
        SyncState,
    };
    use appstore_core::sources::NewCatalogSource;

    const UUID: &str = "0f6f2d5a-6f4e-4d2b-9c1a-5b1e2f3a4b5c";

    fn source() -> CatalogSource {
        NewCatalogSource::new("https://a.test/api", "A").with_id(1)
    }

    fn properties(app_type: AppType, platforms: &[WatchPlatform]) -> AppProperties {
        AppProperties {
            id: Uuid::parse_str(UUID).unwrap(),
            app_type,
            title: "Timer".into(),
            developer_name: "Dev".into(),
            platforms: platforms
                .iter()
                .map(|p| AppPlatform {
                    list_image_url: Some(format!("https://img.test/{}", p.codename())),
                    ..AppPlatform::bare(*p)
                })
                .collect(),
            version: Some("1.2".into()),
            hearts: Some(3),
            category: Some("Tools & Utilities".into()),
            order: 4,
            store_id: None,
            developer_id: None,
            source_link: None,
        }
    }

    fn store_app() -> StoreApplication {
        StoreApplication {
            id: "store-1".into(),
            uuid: Some(UUID.into()),
            title: "Timer".into(),
            author: "Dev".into(),
            kind: "watchapp".into(),
            category_id: "cat-1".into(),
            description: "Counts down".into(),
            compatibility: Compatibility::for_families(&[WatchPlatform::Aplite]),
            latest_release: Some(StoreLatestRelease {
                version: "2.0".into(),
                ..StoreLatestRelease::default()
            }),
            ..StoreApplication::default()
        }
    }

    #[test]
    fn local_entry_prefers_compatible_platform_images() {
        let entry = LocalLockerEntry::Normal {
            properties: properties(AppType::Watchapp, &[WatchPlatform::Aplite, WatchPlatform::Chalk]),
            sideloaded: true,
            configurable: false,
            sync_state: SyncState::Synced,
        };
        let categories = vec![StoreCategory {
            name: "Tools & Utilities".into(),
            slug: "tools-and-utilities".into(),
            ..StoreCategory::default()
        }];
        let view = LockerEntry::from_local(
            &entry,
            WatchPlatform::Chalk,
            ClientPlatform::Android,
            None,
            &categories,
        );
        assert_eq!(view.list_image_url.as_deref(), Some("https://img.test/chalk"));
        assert_eq!(view.category_slug.as_deref(), Some("tools-and-utilities"));
        assert!(view.is_compatible());
        assert!(view.is_synced());
        assert!(view.can_start());
        assert_eq!(view.provenance.order(), Some(4));
    }

    #[test]
    fn incompatible_local_entry_falls_back_to_first_platform() {
        let entry = LocalLockerEntry::Normal {
            properties: properties(AppType::Watchapp, &[WatchPlatform::Chalk]),
            sideloaded: false,
            configurable: false,
            sync_state: SyncState::NotSynced,
        };
        let view = LockerEntry::from_local(
            &entry,
            WatchPlatform::Basalt,
            ClientPlatform::Android,
            None,
            &[],
        );
        assert!(!view.is_compatible());
        assert_eq!(view.list_image_url.as_deref(), Some("https://img.test/chalk"));
        assert!(!view.is_synced());
    }

    #[test]
    fn scaled_local_entry() {
        let entry = LocalLockerEntry::Normal {
            properties: properties(AppType::Watchapp, &[WatchPlatform::Basalt]),
            sideloaded: false,
            configurable: false,
            sync_state: SyncState::Synced,
        };
        let view = LockerEntry::from_local(
            &entry,
            WatchPlatform::Emery,
            ClientPlatform::Android,
            None,
            &[],
        );
        assert!(view.is_compatible());
        assert!(!view.is_natively_compatible());
    }

    #[test]
    fn store_app_view() {
        let categories = vec![StoreCategory {
            id: "cat-1".into(),
            slug: "daily".into(),
            ..StoreCategory::default()
        }];
        let view = LockerEntry::from_store_app(
            &store_app(),
            WatchPlatform::Emery,
            ClientPlatform::Android,
            &source(),
            &categories,
        )
        .unwrap();
        assert_eq!(view.version.as_deref(), Some("2.0"));
        assert_eq!(view.category_slug.as_deref(), Some("daily"));
        assert_eq!(view.store_id.as_deref(), Some("store-1"));
        assert!(view.is_compatible());
        assert!(view.is_natively_compatible());
        assert!(!view.can_start());
        assert!(!view.is_synced());
    }

    #[test]
    fn store_app_with_binary_detail_can_be_scaled() {
        let mut app = store_app();
        app.hardware_platforms = Some(vec![StoreHardwarePlatform {
            name: "aplite".into(),
            sdk_version: None,
            pebble_process_info_flags: Some(1),
        }]);
        let view = LockerEntry::from_store_app(
            &app,
            WatchPlatform::Emery,
            ClientPlatform::Android,
            &source(),
            &[],
        )
        .unwrap();
        assert!(view.is_compatible());
        assert!(!view.is_natively_compatible());
    }

    #[test]
    fn store_app_rejections() {
        let mut unknown = store_app();
        unknown.kind = "widget".into();
        let mut unreleased = store_app();
        unreleased.latest_release = None;
        let mut nil = store_app();
        nil.uuid = Some(Uuid::nil().to_string());
        for app in [unknown, unreleased, nil] {
            assert!(
                LockerEntry::from_store_app(
                    &app,
                    WatchPlatform::Basalt,
                    ClientPlatform::Android,
                    &source(),
                    &[]
                )
                .is_none()
            );
        }
    }

    #[test]
    fn search_hits_are_native() {
        let hit = StoreSearchResult {
            id: "s1".into(),
            uuid: UUID.into(),
            title: "Timer".into(),
            kind: "watchface".into(),
            compatibility: Compatibility::for_families(&[WatchPlatform::Basalt]),
            ..StoreSearchResult::default()
        };
        let view = LockerEntry::from_search_result(
            &hit,
            WatchPlatform::Emery,
            ClientPlatform::Ios,
            &source(),
        )
        .unwrap();
        assert_eq!(view.app_type, AppType::Watchface);
        assert!(view.is_compatible());
        assert!(view.is_natively_compatible());
    }

    #[test]
    fn collection_and_main_screen_rules() {
        let system = LocalLockerEntry::System {
            properties: properties(AppType::Watchapp, &[WatchPlatform::Basalt]),
            system_app: SystemApp::Settings,
        };
        let system = LockerEntry::from_local(
            &system,
            WatchPlatform::Basalt,
            ClientPlatform::Android,
            None,
            &[],
        );
        assert!(!system.show_on_main_screen());
        assert!(system.in_collection(&HashSet::new()));
        assert!(system.is_synced());

        let system_face = LocalLockerEntry::System {
            properties: properties(AppType::Watchface, &[WatchPlatform::Basalt]),
            system_app: SystemApp::Tictoc,
        };
        let system_face = LockerEntry::from_local(
            &system_face,
            WatchPlatform::Basalt,
            ClientPlatform::Android,
            None,
            &[],
        );
        assert!(system_face.show_on_main_screen());

        let store = LockerEntry::from_store_app(
            &store_app(),
            WatchPlatform::Basalt,
            ClientPlatform::Android,
            &source(),
            &[],
        )
        .unwrap();
        assert!(store.show_on_main_screen());
        assert!(!store.in_collection(&HashSet::new()));
        assert!(store.in_collection(&HashSet::from([store.uuid])));
    }

    #[test]
    fn backfill_only_fills_gaps() {
        let local = LocalLockerEntry::Normal {
            properties: AppProperties {
                version: Some("1.0".into()),
                ..properties(AppType::Watchapp, &[])
            },
            sideloaded: false,
            configurable: false,
            sync_state: SyncState::Synced,
        };
        let mut view = LockerEntry::from_local(
            &local,
            WatchPlatform::Basalt,
            ClientPlatform::Android,
            None,
            &[],
        );
        let store = LockerEntry::from_store_app(
            &store_app(),
            WatchPlatform::Basalt,
            ClientPlatform::Android,
            &source(),
            &[],
        )
        .unwrap();
        view.backfill_from(&store);
        assert_eq!(view.version.as_deref(), Some("1.0"));
        assert_eq!(view.description.as_deref(), Some("Counts down"));
        assert_eq!(view.store_id.as_deref(), Some("store-1"));
        assert!(matches!(view.provenance, Provenance::Locker { .. }));
    }
}
