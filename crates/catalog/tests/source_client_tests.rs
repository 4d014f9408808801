//! Integration tests for the per-source catalog client against a fake catalog
//!
//! Each test stands up a wiremock server playing the catalog (and, where
//! needed, the search index) and checks cache read-through, degradation to
//! `None`, and the side effects of a home fetch.

use appstore_cache::DiskCache;
use appstore_catalog::{AlgoliaSearch, CatalogContext, HttpTransport, SourceClient};
use appstore_core::SourceRegistry;
use appstore_core::model::{AccountLockerEntry, AppType, WatchPlatform};
use appstore_core::sources::{MemoryStore, NewCatalogSource};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UUID_A: &str = "0f6f2d5a-6f4e-4d2b-9c1a-5b1e2f3a4b5c";
const UUID_B: &str = "1a2b3c4d-5e6f-4a1b-8c2d-3e4f5a6b7c8d";

fn http() -> HttpTransport {
    HttpTransport::new(Duration::from_secs(5), Duration::from_secs(2)).unwrap()
}

fn context(tmp: &TempDir, server: &MockServer) -> Arc<CatalogContext> {
    let search = AlgoliaSearch::new(http()).with_host(server.uri());
    Arc::new(
        CatalogContext::new(http(), DiskCache::new(tmp.path()))
            .with_search(Arc::new(search))
            .with_fetch_concurrency(2),
    )
}

fn client(tmp: &TempDir, server: &MockServer) -> SourceClient {
    let source = NewCatalogSource::new(format!("{}/api", server.uri()), "Fake")
        .with_search("APP", "KEY", "apps")
        .with_id(1);
    SourceClient::new(source, context(tmp, server))
}

fn app_json(id: &str, uuid: Option<&str>) -> serde_json::Value {
    json!({
        "id": id,
        "uuid": uuid,
        "title": format!("App {id}"),
        "author": "Dev",
        "type": "watchapp",
        "unknown_field": {"ignored": true},
        "latest_release": {"version": "1.0"},
    })
}

#[tokio::test]
async fn test_fetch_app_reads_through_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/apps/id/abc"))
        .and(query_param("platform", "android"))
        .and(query_param("hardware", "basalt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [app_json("abc", Some(UUID_A))],
            "limit": 1,
            "offset": 0,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let client = client(&tmp, &server);
    let first = client
        .fetch_app("abc", Some(WatchPlatform::Basalt), true)
        .await
        .unwrap();
    let second = client
        .fetch_app("abc", Some(WatchPlatform::Basalt), true)
        .await
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(first.data[0].title, "App abc");
}

#[tokio::test]
async fn test_fetch_app_bypasses_cache_on_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/apps/id/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(2)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let client = client(&tmp, &server);
    assert!(client.fetch_app("abc", None, true).await.is_some());
    assert!(client.fetch_app("abc", None, false).await.is_some());
}

#[tokio::test]
async fn test_fetch_app_failure_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    assert!(client(&tmp, &server).fetch_app("abc", None, true).await.is_none());
}

#[tokio::test]
async fn test_fetch_home_filters_and_records_side_effects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/home/faces"))
        .and(query_param("filter_hardware", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "applications": [
                app_json("good", Some(UUID_A)),
                app_json("nil", Some("00000000-0000-0000-0000-000000000000")),
                app_json("bad", Some("not-a-uuid")),
                app_json("missing", None),
            ],
            "categories": [{"id": "c1", "name": "Faces", "slug": "faces"}],
            "collections": [
                {"name": "All", "slug": "all"},
                {"name": "Featured", "slug": "featured"},
            ],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let store = Arc::new(MemoryStore::new());
    let registry = Arc::new(SourceRegistry::new(store.clone(), store));
    let source_id = registry
        .add(NewCatalogSource::new(format!("{}/api", server.uri()), "Fake"))
        .await
        .unwrap();
    let source = registry.get(source_id).await.unwrap().unwrap();
    let client = SourceClient::new(source, context(&tmp, &server)).with_registry(registry.clone());

    let home = client
        .fetch_home(AppType::Watchface, None, true)
        .await
        .unwrap();
    let ids: Vec<_> = home.applications.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["good"]);

    let categories = client
        .cached_categories_or_defaults(Some(AppType::Watchface))
        .await;
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].id, "c1");

    let collections = registry
        .collections(Some(source_id), Some(AppType::Watchface))
        .await
        .unwrap();
    assert_eq!(collections.len(), 2);
    assert!(collections.iter().any(|c| c.slug == "all" && c.enabled));
    assert!(collections.iter().any(|c| c.slug == "featured" && !c.enabled));

    // Served from the home cache, still filtered
    let again = client
        .fetch_home(AppType::Watchface, None, true)
        .await
        .unwrap();
    assert_eq!(again.applications.len(), 1);
}

#[tokio::test]
async fn test_categories_fall_back_to_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let client = client(&tmp, &server);
    let all = client.cached_categories_or_defaults(None).await;
    assert_eq!(all.len(), 7);
    assert_eq!(all[0].slug, "daily");
    assert_eq!(all[6].slug, "faces");

    let apps = client.fetch_categories(AppType::Watchapp, true).await;
    assert_eq!(apps.len(), 6);
}

#[tokio::test]
async fn test_collection_paging() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/apps/collection/all/apps"))
        .and(query_param("offset", "20"))
        .and(query_param("limit", "2"))
        .and(query_param("hardware", "chalk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [app_json("a", Some(UUID_A)), app_json("b", Some(UUID_B))],
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/apps/collection/all/apps"))
        .and(query_param("offset", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [app_json("c", Some(UUID_A))],
        })))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let client = client(&tmp, &server);

    let full = client
        .fetch_collection("collection/all", Some(AppType::Watchapp), WatchPlatform::Chalk, 20, 2)
        .await
        .unwrap();
    assert_eq!(full.apps.len(), 2);
    assert_eq!(full.prev_offset, Some(18));
    assert_eq!(full.next_offset, Some(22));

    let partial = client
        .fetch_collection("collection/all", Some(AppType::Watchapp), WatchPlatform::Chalk, 1, 2)
        .await
        .unwrap();
    assert_eq!(partial.prev_offset, Some(0));
    assert_eq!(partial.next_offset, None);
}

#[tokio::test]
async fn test_search_skips_undecodable_hits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/apps/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": [
                {"id": "s1", "uuid": UUID_A.to_uppercase(), "title": "Timer", "type": "watchapp"},
                {"id": "s2", "uuid": UUID_B, "hearts": "lots"},
            ],
        })))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let client = client(&tmp, &server);
    let results = client.search("timer", Some(AppType::Watchapp)).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "s1");

    assert_eq!(client.search_uuid(UUID_A).await.as_deref(), Some("s1"));
    assert_eq!(client.search_uuid(UUID_B).await, None);
}

#[tokio::test]
async fn test_search_without_credentials_is_empty() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let source = NewCatalogSource::new(format!("{}/api", server.uri()), "No search").with_id(9);
    let client = SourceClient::new(source, context(&tmp, &server));
    assert!(client.search("anything", None).await.is_empty());
    assert!(client.search_uuid(UUID_A).await.is_none());
}

fn account_entry(appstore_id: &str, uuid: &str) -> AccountLockerEntry {
    AccountLockerEntry {
        uuid: Uuid::parse_str(uuid).unwrap(),
        appstore_id: appstore_id.into(),
        appstore_source: "https://legacy.test/api".into(),
        timeline_token: Some(format!("token-{appstore_id}")),
    }
}

#[tokio::test]
async fn test_account_apps_in_bulk() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/apps/bulk"))
        .and(body_json(json!({"ids": ["a", "b"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [app_json("b", Some(UUID_B)), app_json("a", Some(UUID_A))],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let client = client(&tmp, &server);
    assert!(client.supports_bulk_fetch());
    let resolved = client
        .fetch_apps_for_account(&[account_entry("a", UUID_A), account_entry("b", UUID_B)], true)
        .await;
    assert_eq!(resolved.len(), 2);
    let b = resolved.iter().find(|r| r.app.id == "b").unwrap();
    assert_eq!(b.entry.timeline_token.as_deref(), Some("token-b"));
}

#[tokio::test]
async fn test_account_apps_one_by_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/apps/id/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [app_json("a", Some(UUID_A))],
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/apps/id/b"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/apps/id/c"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let client = client(&tmp, &server).with_bulk_fetch(false);
    let resolved = client
        .fetch_apps_for_account(
            &[
                account_entry("a", UUID_A),
                account_entry("b", UUID_B),
                account_entry("c", UUID_B),
            ],
            true,
        )
        .await;
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].app.id, "a");
}
