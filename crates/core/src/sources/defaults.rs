//! Well-known catalog sources seeded on first run

use super::model::NewCatalogSource;

/// Base URL of the primary catalog
pub const PRIMARY_SOURCE_URL: &str = "https://appstore-api.repebble.com/api";
/// Title the primary catalog is seeded with
pub const PRIMARY_SOURCE_TITLE: &str = "Pebble App Store";

/// Base URL of the account-backed community catalog. Its enabled flag
/// follows the account login state.
pub const ACCOUNT_SOURCE_URL: &str = "https://appstore-api.rebble.io/api";
/// Title the account-backed catalog is seeded with
pub const ACCOUNT_SOURCE_TITLE: &str = "Rebble App Store";

/// The sources written by a (re-)seed, in display order
#[must_use]
pub fn default_sources() -> Vec<NewCatalogSource> {
    vec![
        NewCatalogSource::new(PRIMARY_SOURCE_URL, PRIMARY_SOURCE_TITLE).with_search(
            "GM3S9TRYO4",
            "0b83b4f8e4e8e9793d2f1f93c21894aa",
            "apps",
        ),
        NewCatalogSource::new(ACCOUNT_SOURCE_URL, ACCOUNT_SOURCE_TITLE).with_search(
            "7683OW76EQ",
            "252f4938082b8693a8a9fc0157d1d24f",
            "rebble-appstore-production",
        ),
    ]
}

/// Whether `url` is the account-backed catalog
#[must_use]
pub fn is_account_source(url: &str) -> bool {
    url == ACCOUNT_SOURCE_URL
}

/// Whether `url` is the first seeded source
#[must_use]
pub fn is_primary_source(url: &str) -> bool {
    url == PRIMARY_SOURCE_URL
}
