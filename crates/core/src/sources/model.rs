//! Catalog source and collection records

use crate::model::AppType;
use serde::{Deserialize, Serialize};

/// Identity of a persisted source row
pub type SourceId = i64;

/// Search-index credentials of a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCredentials {
    pub app_id: String,
    pub api_key: String,
    pub index_name: String,
}

/// A configured remote catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSource {
    pub id: SourceId,
    /// Base URL, e.g. `https://appstore-api.example.com/api`. Unique.
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub search_app_id: Option<String>,
    #[serde(default)]
    pub search_api_key: Option<String>,
    #[serde(default)]
    pub search_index_name: Option<String>,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
}

const fn enabled_default() -> bool {
    true
}

impl CatalogSource {
    /// Complete search credentials, if all three parts are configured
    #[must_use]
    pub fn search_credentials(&self) -> Option<SearchCredentials> {
        Some(SearchCredentials {
            app_id: self.search_app_id.clone()?,
            api_key: self.search_api_key.clone()?,
            index_name: self.search_index_name.clone()?,
        })
    }

    /// Host part of the URL, for log fields
    #[must_use]
    pub fn host(&self) -> &str {
        let rest = self
            .url
            .split_once("://")
            .map_or(self.url.as_str(), |(_, rest)| rest);
        rest.split('/').next().unwrap_or(rest)
    }
}

/// A source to insert (identity assigned by the store)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCatalogSource {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub search_app_id: Option<String>,
    #[serde(default)]
    pub search_api_key: Option<String>,
    #[serde(default)]
    pub search_index_name: Option<String>,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
}

impl NewCatalogSource {
    /// Enabled source without search credentials
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            search_app_id: None,
            search_api_key: None,
            search_index_name: None,
            enabled: true,
        }
    }

    /// Attach search-index credentials
    #[must_use]
    pub fn with_search(
        mut self,
        app_id: impl Into<String>,
        api_key: impl Into<String>,
        index_name: impl Into<String>,
    ) -> Self {
        self.search_app_id = Some(app_id.into());
        self.search_api_key = Some(api_key.into());
        self.search_index_name = Some(index_name.into());
        self
    }

    /// Materialize with an assigned identity
    #[must_use]
    pub fn with_id(self, id: SourceId) -> CatalogSource {
        CatalogSource {
            id,
            url: self.url,
            title: self.title,
            search_app_id: self.search_app_id,
            search_api_key: self.search_api_key,
            search_index_name: self.search_index_name,
            enabled: self.enabled,
        }
    }
}

/// Per-source home collection toggle, unique on `(source_id, slug, app_type)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppstoreCollection {
    /// 0 for rows not yet persisted
    pub id: i64,
    pub source_id: SourceId,
    pub title: String,
    #[serde(rename = "type")]
    pub app_type: AppType,
    pub slug: String,
    pub enabled: bool,
}

impl AppstoreCollection {
    /// Whether two rows share the unique key
    #[must_use]
    pub fn same_key(&self, other: &Self) -> bool {
        self.source_id == other.source_id
            && self.slug == other.slug
            && self.app_type == other.app_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_need_all_parts() {
        let mut source = NewCatalogSource::new("https://a.test/api", "A")
            .with_search("app", "key", "index")
            .with_id(1);
        assert_eq!(source.search_credentials().unwrap().index_name, "index");
        source.search_api_key = None;
        assert!(source.search_credentials().is_none());
    }

    #[test]
    fn host_extraction() {
        let source = NewCatalogSource::new("https://appstore-api.example.com/api", "A").with_id(1);
        assert_eq!(source.host(), "appstore-api.example.com");
    }

    #[test]
    fn enabled_defaults_to_true_when_missing() {
        let source: CatalogSource =
            serde_json::from_str(r#"{"id": 3, "url": "https://x.test", "title": "X"}"#).unwrap();
        assert!(source.enabled);
        assert!(source.search_app_id.is_none());
    }
}
