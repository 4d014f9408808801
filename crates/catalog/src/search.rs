//! Search-index client
//!
//! Sources publish their catalog to an Algolia index. Hits come back as raw
//! JSON objects; decoding them is the caller's concern so one malformed hit
//! cannot sink a whole result page.

use crate::http::HttpTransport;
use crate::Result;
use appstore_core::sources::SearchCredentials;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Free-text query against one source's search index
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Raw hits for `query`, optionally restricted by a tag
    async fn query(
        &self,
        credentials: &SearchCredentials,
        query: &str,
        tag_filter: Option<&str>,
    ) -> Result<Vec<serde_json::Value>>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryBody<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag_filters: Option<[&'a str; 1]>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QueryResponse {
    hits: Vec<serde_json::Value>,
}

/// Algolia REST search
#[derive(Debug, Clone)]
pub struct AlgoliaSearch {
    http: HttpTransport,
    host_override: Option<String>,
}

impl AlgoliaSearch {
    /// Search through `http` against the hosted Algolia endpoint
    #[must_use]
    pub const fn new(http: HttpTransport) -> Self {
        Self {
            http,
            host_override: None,
        }
    }

    /// Send queries to `base_url` instead of `https://<app>-dsn.algolia.net`
    #[must_use]
    pub fn with_host(mut self, base_url: impl Into<String>) -> Self {
        self.host_override = Some(base_url.into());
        self
    }

    fn query_url(&self, credentials: &SearchCredentials) -> String {
        let base = self.host_override.clone().unwrap_or_else(|| {
            format!(
                "https://{}-dsn.algolia.net",
                credentials.app_id.to_lowercase()
            )
        });
        format!(
            "{}/1/indexes/{}/query",
            base.trim_end_matches('/'),
            credentials.index_name
        )
    }
}

#[async_trait]
impl SearchIndex for AlgoliaSearch {
    async fn query(
        &self,
        credentials: &SearchCredentials,
        query: &str,
        tag_filter: Option<&str>,
    ) -> Result<Vec<serde_json::Value>> {
        let url = self.query_url(credentials);
        let body = QueryBody {
            query,
            tag_filters: tag_filter.map(|tag| [tag]),
        };
        let response: QueryResponse = self
            .http
            .post_json_with_headers(
                &url,
                &[
                    ("X-Algolia-Application-Id", credentials.app_id.as_str()),
                    ("X-Algolia-API-Key", credentials.api_key.as_str()),
                ],
                &body,
            )
            .await?;
        tracing::debug!(%url, hits = response.hits.len(), "search index answered");
        Ok(response.hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> SearchCredentials {
        SearchCredentials {
            app_id: "APPID".into(),
            api_key: "KEY".into(),
            index_name: "apps".into(),
        }
    }

    fn http() -> HttpTransport {
        HttpTransport::new(Duration::from_secs(5), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn hosted_url() {
        let search = AlgoliaSearch::new(http());
        assert_eq!(
            search.query_url(&credentials()),
            "https://appid-dsn.algolia.net/1/indexes/apps/query"
        );
    }

    #[tokio::test]
    async fn posts_query_with_tag_filter() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1/indexes/apps/query"))
            .and(header("x-algolia-application-id", "APPID"))
            .and(header("x-algolia-api-key", "KEY"))
            .and(body_json(serde_json::json!({
                "query": "timer",
                "tagFilters": ["watchapp"],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "hits": [{"title": "Timer"}, {"title": "Stopwatch"}],
                "nbHits": 2,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let search = AlgoliaSearch::new(http()).with_host(server.uri());
        let hits = search
            .query(&credentials(), "timer", Some("watchapp"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0]["title"], "Timer");
    }

    #[tokio::test]
    async fn omits_tag_filter_when_unset() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(serde_json::json!({"query": "x"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let search = AlgoliaSearch::new(http()).with_host(server.uri());
        let hits = search.query(&credentials(), "x", None).await.unwrap();
        assert!(hits.is_empty());
    }
}
