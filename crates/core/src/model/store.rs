//! Catalog wire types
//!
//! Every struct decodes permissively: a missing field or an explicit `null`
//! becomes the field's default, and unknown fields are ignored. Unless stated
//! otherwise, strings default to `""`, numbers to `0`, booleans to `false`,
//! lists and maps to empty, and `Option` fields to `None`.

use super::lenient::null_as_default;
use super::platform::{AppType, ClientPlatform, WatchPlatform};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Size label (e.g. `144x168`) to image URL, in payload order
pub type ImageMap = IndexMap<String, Option<String>>;

/// First URL of an image map, in payload order
#[must_use]
pub fn first_image(images: &ImageMap) -> Option<&str> {
    images.values().find_map(|url| url.as_deref())
}

/// Support flag for one watch family or phone OS
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSupport {
    /// Default: `false`
    #[serde(deserialize_with = "null_as_default")]
    pub supported: bool,
}

impl PlatformSupport {
    /// A supported flag
    #[must_use]
    pub const fn supported() -> Self {
        Self { supported: true }
    }
}

/// Per-family and per-phone-OS support declared by a catalog entity.
///
/// A missing block means "not supported". `flint` and `gabbro` are absent
/// from older payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Compatibility {
    #[serde(deserialize_with = "null_as_default")]
    pub aplite: PlatformSupport,
    #[serde(deserialize_with = "null_as_default")]
    pub basalt: PlatformSupport,
    #[serde(deserialize_with = "null_as_default")]
    pub chalk: PlatformSupport,
    #[serde(deserialize_with = "null_as_default")]
    pub diorite: PlatformSupport,
    #[serde(deserialize_with = "null_as_default")]
    pub emery: PlatformSupport,
    pub flint: Option<PlatformSupport>,
    pub gabbro: Option<PlatformSupport>,
    #[serde(deserialize_with = "null_as_default")]
    pub android: PlatformSupport,
    #[serde(deserialize_with = "null_as_default")]
    pub ios: PlatformSupport,
}

impl Compatibility {
    /// Families the entity ships a variant for
    #[must_use]
    pub fn supported_variants(&self) -> Vec<WatchPlatform> {
        let flags = [
            (WatchPlatform::Aplite, self.aplite.supported),
            (WatchPlatform::Basalt, self.basalt.supported),
            (WatchPlatform::Chalk, self.chalk.supported),
            (WatchPlatform::Diorite, self.diorite.supported),
            (WatchPlatform::Emery, self.emery.supported),
            (
                WatchPlatform::Flint,
                self.flint.as_ref().is_some_and(|s| s.supported),
            ),
            (
                WatchPlatform::Gabbro,
                self.gabbro.as_ref().is_some_and(|s| s.supported),
            ),
        ];
        flags
            .into_iter()
            .filter_map(|(platform, supported)| supported.then_some(platform))
            .collect()
    }

    /// Whether the entity works with the given phone OS
    #[must_use]
    pub const fn supports_client(&self, client: ClientPlatform) -> bool {
        match client {
            ClientPlatform::Android => self.android.supported,
            ClientPlatform::Ios => self.ios.supported,
        }
    }

    /// Build a descriptor supporting exactly `families` on both phone OSes
    #[must_use]
    pub fn for_families(families: &[WatchPlatform]) -> Self {
        let flag = |p| PlatformSupport {
            supported: families.contains(&p),
        };
        Self {
            aplite: flag(WatchPlatform::Aplite),
            basalt: flag(WatchPlatform::Basalt),
            chalk: flag(WatchPlatform::Chalk),
            diorite: flag(WatchPlatform::Diorite),
            emery: flag(WatchPlatform::Emery),
            flint: Some(flag(WatchPlatform::Flint)),
            gabbro: Some(flag(WatchPlatform::Gabbro)),
            android: PlatformSupport::supported(),
            ios: PlatformSupport::supported(),
        }
    }
}

/// One published binary of an entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreHardwarePlatform {
    /// Family codename
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub sdk_version: Option<String>,
    /// Present only when a native binary exists for `name`
    pub pebble_process_info_flags: Option<i64>,
}

/// Companion phone app
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreCompanionApp {
    pub id: Option<i64>,
    pub icon: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub url: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub required: bool,
    pub pebblekit_version: Option<String>,
}

/// Companion apps per phone OS
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreCompanions {
    pub android: Option<StoreCompanionApp>,
    pub ios: Option<StoreCompanionApp>,
}

/// Newest published release
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreLatestRelease {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    pub js_md5: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub js_version: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub pbw_file: String,
    #[serde(deserialize_with = "null_as_default")]
    pub published_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub release_notes: String,
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
}

/// One changelog line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreChangelogEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub published_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub release_notes: String,
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
}

/// A catalog application or watchface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreApplication {
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(deserialize_with = "null_as_default")]
    pub capabilities: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub category_color: String,
    #[serde(deserialize_with = "null_as_default")]
    pub category_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub changelog: Vec<StoreChangelogEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub companions: StoreCompanions,
    #[serde(deserialize_with = "null_as_default")]
    pub compatibility: Compatibility,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub developer_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub header_images: Vec<ImageMap>,
    #[serde(deserialize_with = "null_as_default")]
    pub hearts: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub icon_image: ImageMap,
    /// Store identity (not the universal id)
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    pub latest_release: Option<StoreLatestRelease>,
    #[serde(deserialize_with = "null_as_default")]
    pub list_image: ImageMap,
    pub published_date: Option<String>,
    pub screenshot_hardware: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub screenshot_images: Vec<ImageMap>,
    pub source: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    /// `watchface` or `watchapp`
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    /// Universal id; may be missing or malformed in the wild
    pub uuid: Option<String>,
    /// Default: `false`
    #[serde(deserialize_with = "null_as_default")]
    pub visible: bool,
    pub website: Option<String>,
    /// Per-binary detail. `None` when the catalog does not report it.
    pub hardware_platforms: Option<Vec<StoreHardwarePlatform>>,
}

impl StoreApplication {
    /// Parsed [`AppType`], if the `type` string is known
    #[must_use]
    pub fn app_type(&self) -> Option<AppType> {
        AppType::from_code(&self.kind)
    }

    /// Parsed universal id. The nil UUID counts as absent.
    #[must_use]
    pub fn parsed_uuid(&self) -> Option<Uuid> {
        self.uuid
            .as_deref()
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .filter(|id| !id.is_nil())
    }

    /// First list image URL
    #[must_use]
    pub fn list_image_url(&self) -> Option<&str> {
        first_image(&self.list_image)
    }

    /// First URL of every screenshot
    #[must_use]
    pub fn screenshot_urls(&self) -> Vec<String> {
        self.screenshot_images
            .iter()
            .filter_map(|images| first_image(images).map(str::to_string))
            .collect()
    }

    /// First header image URL
    #[must_use]
    pub fn header_image_url(&self) -> Option<&str> {
        self.header_images.iter().find_map(first_image)
    }
}

/// Pagination links of a list response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreResponseLinks {
    #[serde(rename = "nextPage")]
    pub next_page: Option<String>,
}

/// Response of the single-app and collection endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreAppResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub data: Vec<StoreApplication>,
    #[serde(deserialize_with = "null_as_default")]
    pub limit: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub links: StoreResponseLinks,
    #[serde(deserialize_with = "null_as_default")]
    pub offset: u32,
}

/// Response of the bulk endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkStoreResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub data: Vec<StoreApplication>,
}

/// A store category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreCategory {
    #[serde(deserialize_with = "null_as_default")]
    pub application_ids: Vec<String>,
    /// Hex color without `#`
    #[serde(deserialize_with = "null_as_default")]
    pub color: String,
    #[serde(deserialize_with = "null_as_default")]
    pub icon: ImageMap,
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub links: IndexMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
}

/// A curated collection on the home screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreCollection {
    #[serde(deserialize_with = "null_as_default")]
    pub application_ids: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub links: IndexMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
}

/// Home bundle for one app type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppStoreHome {
    #[serde(deserialize_with = "null_as_default")]
    pub applications: Vec<StoreApplication>,
    #[serde(deserialize_with = "null_as_default")]
    pub categories: Vec<StoreCategory>,
    #[serde(deserialize_with = "null_as_default")]
    pub collections: Vec<StoreCollection>,
}

/// Screenshots for one family
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreAssetCollection {
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub hardware_platform: String,
    #[serde(deserialize_with = "null_as_default")]
    pub screenshots: Vec<String>,
}

/// One search-index hit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSearchResult {
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub compatibility: Compatibility,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub hearts: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub icon_image: String,
    #[serde(deserialize_with = "null_as_default")]
    pub list_image: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub uuid: String,
    /// Store identity
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub screenshot_images: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub asset_collections: Vec<StoreAssetCollection>,
}

impl StoreSearchResult {
    /// Parsed [`AppType`]
    #[must_use]
    pub fn app_type(&self) -> Option<AppType> {
        AppType::from_code(&self.kind)
    }

    /// Parsed universal id; nil counts as absent
    #[must_use]
    pub fn parsed_uuid(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.uuid).ok().filter(|id| !id.is_nil())
    }
}
