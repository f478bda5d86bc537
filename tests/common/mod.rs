//! Shared test harness: builds the application router against a wiremock
//! upstream standing in for the catalog/payment/order services, with a
//! stubbed identity-provider token exchange.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{body, body::Body, response::Response, Router};
use http::{Method, Request};
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

use storefront_api::{
    app_router,
    config::AppConfig,
    errors::ServiceError,
    services::{
        catalog::CatalogStore,
        checkout::CheckoutService,
        gateway::ApiGateway,
        orders::{AccessTokenProvider, OrderProxyService},
    },
    AppState,
};

/// Token provider returning a fixed token (or none) without any HTTP.
pub struct StubTokenProvider {
    token: Option<String>,
}

#[async_trait]
impl AccessTokenProvider for StubTokenProvider {
    async fn access_token(
        &self,
        _session_cookie: Option<&str>,
    ) -> Result<Option<String>, ServiceError> {
        Ok(self.token.clone())
    }
}

pub struct TestApp {
    pub upstream: MockServer,
    pub state: AppState,
    router: Router,
}

impl TestApp {
    /// Fully configured app: publishable key present, session token "tok_abc".
    pub async fn new() -> Self {
        Self::with_options(Some("pk_test_123"), Some("tok_abc")).await
    }

    pub async fn with_options(publishable_key: Option<&str>, token: Option<&str>) -> Self {
        let upstream = MockServer::start().await;
        let config = test_app_config(&upstream.uri(), publishable_key);

        let gateway = Arc::new(ApiGateway::new(&config).expect("gateway"));
        let catalog = CatalogStore::new(gateway.clone());
        let checkout = Arc::new(CheckoutService::new(
            gateway.clone(),
            config.stripe_publishable_key.clone(),
            config.default_currency.clone(),
        ));
        let tokens: Arc<dyn AccessTokenProvider> = Arc::new(StubTokenProvider {
            token: token.map(String::from),
        });
        let orders = Arc::new(OrderProxyService::new(&config, tokens).expect("order proxy"));

        let state = AppState {
            config,
            gateway,
            catalog,
            checkout,
            orders,
        };
        let router = app_router(state.clone());

        Self {
            upstream,
            state,
            router,
        }
    }

    pub async fn get(&self, path: &str) -> Response {
        self.request(Method::GET, path, None, &[]).await
    }

    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> Response {
        self.request(Method::GET, path, None, headers).await
    }

    pub async fn post_json(&self, path: &str, payload: Value) -> Response {
        self.request(Method::POST, path, Some(payload), &[]).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        payload: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request = match payload {
            Some(json) => builder
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("response")
    }
}

pub fn test_app_config(upstream_uri: &str, publishable_key: Option<&str>) -> AppConfig {
    AppConfig {
        api_base_url: upstream_uri.to_string(),
        internal_base_url: upstream_uri.to_string(),
        stripe_publishable_key: publishable_key.map(String::from),
        auth_base_url: None,
        host: "127.0.0.1".into(),
        port: 0,
        environment: "development".into(),
        log_level: "info".into(),
        log_json: false,
        default_currency: "usd".into(),
        http_client_timeout_secs: 5,
        cors_allowed_origins: None,
        cors_allow_any_origin: false,
        cors_allow_credentials: false,
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
