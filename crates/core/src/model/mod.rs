//! Catalog and locker data model

mod lenient;
pub mod locker;
pub mod platform;
pub mod store;

pub use lenient::null_as_default;
pub use locker::{
    AccountLockerEntry, AppPlatform, AppProperties, LocalLockerEntry, SyncState, SystemApp,
    is_valid_app_version,
};
pub use platform::{AppType, ClientPlatform, WatchPlatform};
pub use store::{
    AppStoreHome, BulkStoreResponse, Compatibility, ImageMap, PlatformSupport,
    StoreAppResponse, StoreApplication, StoreAssetCollection, StoreCategory,
    StoreChangelogEntry, StoreCollection, StoreCompanionApp, StoreCompanions,
    StoreHardwarePlatform, StoreLatestRelease, StoreResponseLinks, StoreSearchResult,
    first_image,
};
