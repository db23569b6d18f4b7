//! Integration tests for the OntoSight REST API.
//!
//! Run with: `cargo test --package ontosight-api --test api_integration`

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use ontosight_api::{create_api_router, create_api_state};
use ontosight_core::{
    DataService, Edge, GraphStore, Hyperedge, HypergraphStore, Node, QueryHandlers,
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn graph_service() -> DataService {
    let store = GraphStore::new(
        vec![
            Node::new("a", "Alpha"),
            Node::new("b", "Beta"),
            Node::new("c", "Gamma"),
            Node::new("d", "Delta"),
        ],
        vec![
            Edge::new("ab", "a", "b"),
            Edge::new("bc", "b", "c"),
            Edge::new("cd", "c", "d"),
        ],
    )
    .unwrap();
    DataService::new(Box::new(store)).with_hops(1)
}

/// Create a test router mounted like the server does.
fn create_test_router(service: DataService) -> Router {
    Router::new().nest("/api", create_api_router(create_api_state(service)))
}

fn router_with_handlers() -> Router {
    create_test_router(graph_service().with_handlers(QueryHandlers::builtin()))
}

/// Helper to make a GET request.
async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!(null));

    (status, json)
}

/// Helper to make a POST request with JSON body.
async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!(null));

    (status, json)
}

fn node_ids(dataset: &Value) -> Vec<&str> {
    dataset["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap())
        .collect()
}

// =============================================================================
// Health & meta
// =============================================================================

#[tokio::test]
async fn test_health() {
    let router = router_with_handlers();
    let (status, body) = get(&router, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["kind"], "graph");
    assert_eq!(body["stats"]["total_nodes"], 4);
}

#[tokio::test]
async fn test_health_head() {
    let router = router_with_handlers();
    let request = Request::builder()
        .method(Method::HEAD)
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_meta_reports_type_and_features() {
    let (status, body) = get(&router_with_handlers(), "/api/meta").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "graph");
    assert_eq!(body["features"]["search"], true);
    assert_eq!(body["features"]["chat"], true);

    let (_, bare) = get(&create_test_router(graph_service()), "/api/meta").await;
    assert_eq!(bare["features"]["search"], false);
}

// =============================================================================
// Data & details
// =============================================================================

#[tokio::test]
async fn test_default_data_uses_highest_degree_center() {
    let (status, body) = get(&router_with_handlers(), "/api/data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(node_ids(&body), vec!["a", "b", "c"]);
    assert!(body["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .all(|n| n.get("highlighted").is_none()));
}

#[tokio::test]
async fn test_data_around_ids_highlights_centers() {
    let (status, body) = get(&router_with_handlers(), "/api/data?ids=d").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(node_ids(&body), vec!["c", "d"]);
    assert_eq!(body["nodes"][1]["highlighted"], true);
    assert_eq!(body["edges"][0]["id"], "cd");
}

#[tokio::test]
async fn test_details() {
    let router = router_with_handlers();
    let (status, body) = get(&router, "/api/details/b").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "node");
    assert_eq!(body["label"], "Beta");

    let (status, body) = get(&router, "/api/details/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

// =============================================================================
// Search & chat
// =============================================================================

#[tokio::test]
async fn test_search_highlights_matches() {
    let (status, body) = post(&router_with_handlers(), "/api/search", json!({"query": "GAM"})).await;
    assert_eq!(status, StatusCode::OK);
    let gamma = body["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["id"] == "c")
        .unwrap();
    assert_eq!(gamma["highlighted"], true);
}

#[tokio::test]
async fn test_search_rejects_blank_query() {
    let (status, body) = post(&router_with_handlers(), "/api/search", json!({"query": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "empty_query");
}

#[tokio::test]
async fn test_search_without_handler() {
    let router = create_test_router(graph_service());
    let (status, body) = post(&router, "/api/search", json!({"query": "alpha"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "callback_not_registered");
}

#[tokio::test]
async fn test_chat_answers_with_data() {
    let router = router_with_handlers();
    let (status, body) = post(&router, "/api/chat", json!({"query": "tell me about delta"})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["response"].as_str().unwrap().starts_with("Found 1"));
    assert!(body["data"]["nodes"].is_array());

    let (status, body) = post(&router, "/api/chat", json!({"query": "zzz"})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("data").is_none());
}

// =============================================================================
// Pagination
// =============================================================================

#[tokio::test]
async fn test_nodes_paginated() {
    let router = router_with_handlers();
    let (status, body) = get(&router, "/api/nodes_paginated?page=0&page_size=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 3);
    assert_eq!(body["total"], 4);
    assert_eq!(body["has_next"], true);
    assert_eq!(body["items"][0]["type"], "node");

    let (_, body) = get(&router, "/api/nodes_paginated?page=1&page_size=3").await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["has_next"], false);
}

#[tokio::test]
async fn test_unsupported_listing() {
    let (status, body) = get(&router_with_handlers(), "/api/hyperedges_paginated").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "unsupported_entity");
}

#[tokio::test]
async fn test_hypergraph_data_carries_layout_edges() {
    let store = HypergraphStore::new(
        vec![Node::new("a", "A"), Node::new("b", "B"), Node::new("c", "C")],
        vec![Hyperedge::new("h", "Team", ["a", "b", "c"])],
    )
    .unwrap();
    let router = create_test_router(DataService::new(Box::new(store)));

    let (status, body) = get(&router, "/api/data?ids=h").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hyperedges"][0]["id"], "h");
    assert_eq!(body["edges"].as_array().unwrap().len(), 2);

    let (status, body) = get(&router, "/api/hyperedges_paginated").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
}
