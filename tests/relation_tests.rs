//! Integration tests for relation traversal and link mutation.

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

fn route_resource(guid: &str, host: &str) -> serde_json::Value {
    json!({
        "metadata": {"guid": guid},
        "entity": {"host": host}
    })
}

// ============================================================================
// To-one resolution
// ============================================================================

#[tokio::test]
async fn test_to_one_materializes_inline_entity_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/apps/app-1"))
        .and(query_param("inline-relations-depth", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": {"guid": "app-1"},
            "entity": {
                "name": "dora",
                "space_guid": "space-1",
                "space": {
                    "metadata": {"guid": "space-1"},
                    "entity": {"name": "staging"}
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut app = client.find_with_depth("app", "app-1", 1).await.unwrap();

    // No /v2/spaces mock exists: resolution must use the inline entity.
    let space = app.to_one(&client, "space").await.unwrap().unwrap();
    assert_eq!(space.guid(), Some("space-1"));
    assert_eq!(space.get_local("name").unwrap(), json!("staging"));
}

#[tokio::test]
async fn test_to_one_fetches_relation_url_when_not_inline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/apps/app-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": {"guid": "app-1"},
            "entity": {"name": "dora", "space_url": "/v2/spaces/space-1"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/spaces/space-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": {"guid": "space-1"},
            "entity": {"name": "staging"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut app = client.find("app", "app-1").await.unwrap();

    let space = app.to_one(&client, "space").await.unwrap().unwrap();
    assert_eq!(space.guid(), Some("space-1"));

    // Second resolution hits the cache (expect(1) above).
    let again = app.to_one(&client, "space").await.unwrap().unwrap();
    assert_eq!(again.guid(), Some("space-1"));
}

#[tokio::test]
async fn test_to_one_defaults_to_none_without_inline_or_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/apps/app-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": {"guid": "app-1"},
            "entity": {"name": "dora"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut app = client.find("app", "app-1").await.unwrap();

    let space = app.to_one(&client, "space").await.unwrap();
    assert!(space.is_none());
}

// ============================================================================
// To-many resolution
// ============================================================================

#[tokio::test]
async fn test_to_many_materializes_inline_collection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/apps/app-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": {"guid": "app-1"},
            "entity": {
                "name": "dora",
                "routes": [
                    route_resource("route-1", "dora"),
                    route_resource("route-2", "dora-staging"),
                ]
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut app = client.find("app", "app-1").await.unwrap();

    let routes = app.to_many(&client, "routes").await.unwrap();
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0].guid(), Some("route-1"));
    assert_eq!(routes[1].get_local("host").unwrap(), json!("dora-staging"));
}

#[tokio::test]
async fn test_to_many_fetches_collection_endpoint_through_all_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/apps/app-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": {"guid": "app-1"},
            "entity": {"name": "dora"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/apps/app-1/routes"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next_url": null,
            "resources": [route_resource("route-2", "dora-staging")]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/apps/app-1/routes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "next_url": "/v2/apps/app-1/routes?page=2",
            "resources": [route_resource("route-1", "dora")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut app = client.find("app", "app-1").await.unwrap();

    let routes = app.to_many(&client, "routes").await.unwrap();
    let guids: Vec<&str> = routes.iter().filter_map(|route| route.guid()).collect();
    assert_eq!(guids, vec!["route-1", "route-2"]);

    // Cached after resolution: no further requests (expect(1) each).
    let again = app.to_many(&client, "routes").await.unwrap();
    assert_eq!(again.len(), 2);
}

// ============================================================================
// Link mutation
// ============================================================================

#[tokio::test]
async fn test_add_to_links_remotely_then_updates_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/apps/app-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": {"guid": "app-1"},
            "entity": {"name": "dora", "routes": []}
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v2/apps/app-1/routes/route-9"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut app = client.find("app", "app-1").await.unwrap();
    assert!(app.to_many(&client, "routes").await.unwrap().is_empty());

    let route = client.build_with_guid("route", "route-9").unwrap();
    app.add_to(&client, "routes", &route).await.unwrap();

    let routes = app.to_many(&client, "routes").await.unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].guid(), Some("route-9"));

    // Adding an already-present member calls the endpoint again but never
    // duplicates the cache entry.
    app.add_to(&client, "routes", &route).await.unwrap();
    assert_eq!(app.to_many(&client, "routes").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_link_call_leaves_cache_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/apps/app-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": {"guid": "app-1"},
            "entity": {
                "name": "dora",
                "routes": [route_resource("route-1", "dora")]
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v2/apps/app-1/routes/route-9"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v2/apps/app-1/routes/route-1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut app = client.find("app", "app-1").await.unwrap();
    assert_eq!(app.to_many(&client, "routes").await.unwrap().len(), 1);

    // Failed add: nothing appears.
    let new_route = client.build_with_guid("route", "route-9").unwrap();
    let error = app.add_to(&client, "routes", &new_route).await.unwrap_err();
    assert!(matches!(error, ApiError::BadResponse { status: 500, .. }));
    assert_eq!(app.to_many(&client, "routes").await.unwrap().len(), 1);

    // Failed remove: nothing disappears.
    let existing = client.build_with_guid("route", "route-1").unwrap();
    let error = app
        .remove_from(&client, "routes", &existing)
        .await
        .unwrap_err();
    assert!(matches!(error, ApiError::BadResponse { status: 500, .. }));

    let routes = app.to_many(&client, "routes").await.unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].guid(), Some("route-1"));
}

#[tokio::test]
async fn test_remove_from_unlinks_remotely_then_updates_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/apps/app-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": {"guid": "app-1"},
            "entity": {
                "name": "dora",
                "routes": [route_resource("route-1", "dora")]
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v2/apps/app-1/routes/route-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut app = client.find("app", "app-1").await.unwrap();
    assert_eq!(app.to_many(&client, "routes").await.unwrap().len(), 1);

    let route = client.build_with_guid("route", "route-1").unwrap();
    app.remove_from(&client, "routes", &route).await.unwrap();

    assert!(app.to_many(&client, "routes").await.unwrap().is_empty());
}

// ============================================================================
// Summary hydration
// ============================================================================

#[tokio::test]
async fn test_summarize_populates_the_graph_in_one_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/apps/app-1/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "guid": "app-1",
            "name": "dora",
            "instances": 3,
            "urls": ["dora.apps.example.com"],
            "routes": [
                {"guid": "route-1", "host": "dora"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut app = client.build_with_guid("app", "app-1").unwrap();

    let body = app.summarize(&client).await.unwrap();
    assert_eq!(body["urls"][0], "dora.apps.example.com");

    // Attributes and relations hydrated locally; no further requests.
    assert_eq!(app.get_local("name").unwrap(), json!("dora"));
    assert_eq!(app.get_local("total_instances").unwrap(), json!(3));
    let routes = app.to_many(&client, "routes").await.unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].get_local("host").unwrap(), json!("dora"));
}
