//! Integration tests for pagination and collection queries.

use cloud_controller::schema::{Comparator, Query};
use cloud_controller::{ApiError, Client, ClientConfig, TargetUrl};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Client {
    let config = ClientConfig::builder()
        .target(TargetUrl::new(server.uri()).unwrap())
        .build()
        .unwrap();
    Client::new(config)
}

fn app_resource(guid: &str) -> serde_json::Value {
    json!({
        "metadata": {"guid": guid, "url": format!("/v2/apps/{guid}")},
        "entity": {"name": guid}
    })
}

// ============================================================================
// Page following
// ============================================================================

#[tokio::test]
async fn test_three_pages_of_two_yield_six_in_order_from_three_requests() {
    let server = MockServer::start().await;

    // Specific page mocks first: wiremock uses the first matching mock.
    Mock::given(method("GET"))
        .and(path("/v2/apps"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next_url": "/v2/apps?page=3",
            "resources": [app_resource("app-3"), app_resource("app-4")]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/apps"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next_url": null,
            "resources": [app_resource("app-5"), app_resource("app-6")]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/apps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next_url": "/v2/apps?page=2",
            "resources": [app_resource("app-1"), app_resource("app-2")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let apps = client.all("app").await.unwrap();

    let guids: Vec<&str> = apps.iter().filter_map(|app| app.guid()).collect();
    assert_eq!(
        guids,
        vec!["app-1", "app-2", "app-3", "app-4", "app-5", "app-6"]
    );
}

#[tokio::test]
async fn test_single_page_without_next_url_makes_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/domains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resources": [{
                "metadata": {"guid": "domain-1"},
                "entity": {"name": "apps.example.com"}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let domains = client.all("domain").await.unwrap();
    assert_eq!(domains.len(), 1);
    assert_eq!(domains[0].guid(), Some("domain-1"));
}

#[tokio::test]
async fn test_empty_collection_yields_no_resources() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/routes"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"resources": [], "next_url": null})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let routes = client.all("route").await.unwrap();
    assert!(routes.is_empty());
}

// ============================================================================
// Query encoding
// ============================================================================

#[tokio::test]
async fn test_find_all_by_sends_the_q_predicate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/apps"))
        .and(query_param("q", "name:dora;space_guid:space-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resources": [app_resource("app-1")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = Query::new()
        .filter("name", Comparator::Eq, "dora")
        .filter("space_guid", Comparator::Eq, "space-1");

    let apps = client.find_all_by("app", &query).await.unwrap();
    assert_eq!(apps.len(), 1);
}

#[tokio::test]
async fn test_find_by_returns_first_match_from_a_single_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/apps"))
        .and(query_param("q", "name:dora"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            // A next_url is present but find_by never follows it.
            "next_url": "/v2/apps?page=2",
            "resources": [app_resource("app-1"), app_resource("app-2")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = Query::new().filter("name", Comparator::Eq, "dora");

    let found = client.find_by("app", &query).await.unwrap();
    assert_eq!(found.unwrap().guid(), Some("app-1"));
}

#[tokio::test]
async fn test_find_by_returns_none_on_empty_collection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/apps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resources": []})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = Query::new().filter("name", Comparator::Eq, "missing");
    let found = client.find_by("app", &query).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_undeclared_filter_key_is_rejected_client_side() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let query = Query::new().filter("memory", Comparator::Gt, "128");
    let error = client.find_all_by("app", &query).await.unwrap_err();
    assert!(matches!(
        error,
        ApiError::NotQueryable { ref attribute, .. } if attribute == "memory"
    ));
}

// ============================================================================
// Scope routing
// ============================================================================

#[tokio::test]
async fn test_scoped_type_routes_through_current_space() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/spaces/space-1/apps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resources": [app_resource("app-1")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.set_current_space(Some("space-1".to_string()));

    let apps = client.all("app").await.unwrap();
    assert_eq!(apps.len(), 1);
}

#[tokio::test]
async fn test_inline_relations_depth_travels_with_the_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/apps"))
        .and(query_param("inline-relations-depth", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resources": [app_resource("app-1")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let apps = client
        .find_all_by("app", &Query::new().depth(1))
        .await
        .unwrap();
    assert_eq!(apps.len(), 1);
}
