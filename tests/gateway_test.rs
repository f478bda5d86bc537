//! Integration tests for the gateway client's response normalization.

mod common;

use common::test_app_config;
use serde_json::{json, Value};
use storefront_api::services::gateway::ApiGateway;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn gateway_against(upstream: &MockServer) -> ApiGateway {
    let config = test_app_config(&upstream.uri(), Some("pk_test_123"));
    ApiGateway::new(&config).expect("gateway")
}

#[tokio::test]
async fn no_content_responses_carry_no_body() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&upstream)
        .await;

    let gateway = gateway_against(&upstream).await;
    let body: Option<Value> = gateway.get("/products").await.expect("request");

    assert_eq!(body, None);
}

#[tokio::test]
async fn server_message_field_wins_over_the_status_fallback() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "catalog exploded" })),
        )
        .mount(&upstream)
        .await;

    let gateway = gateway_against(&upstream).await;
    let err = gateway.fetch_products().await.unwrap_err();

    assert_eq!(err.to_string(), "catalog exploded");
}

#[tokio::test]
async fn unparseable_error_bodies_fall_back_to_the_status_line() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&upstream)
        .await;

    let gateway = gateway_against(&upstream).await;
    let err = gateway.fetch_products().await.unwrap_err();

    assert_eq!(err.to_string(), "API Error: 500 Internal Server Error");
}

#[tokio::test]
async fn connection_failures_surface_as_external_api_errors() {
    // Reserve a port, then drop the server so nothing is listening on it.
    let upstream = MockServer::start().await;
    let uri = upstream.uri();
    drop(upstream);

    let config = test_app_config(&uri, Some("pk_test_123"));
    let gateway = ApiGateway::new(&config).expect("gateway");

    let err = gateway.fetch_products().await.unwrap_err();
    assert!(matches!(
        err,
        storefront_api::errors::ServiceError::ExternalApiError(_)
    ));
}

#[tokio::test]
async fn empty_body_on_a_typed_fetch_is_an_error() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/d1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&upstream)
        .await;

    let gateway = gateway_against(&upstream).await;
    let err = gateway.fetch_product("d1").await.unwrap_err();

    assert!(err.to_string().contains("empty response"), "{err}");
}
