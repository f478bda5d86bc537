//! Storefront API Library
//!
//! Backend-for-frontend service for the storefront: product browsing,
//! checkout hand-off to the external payment provider, and order history
//! proxying. All business logic lives in external services; this crate is
//! presentation plumbing and thin API-proxying.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod models;
pub mod openapi;
pub mod services;

use std::sync::Arc;

use axum::{routing::get, Router};

use services::{
    catalog::CatalogStore, checkout::CheckoutService, gateway::ApiGateway,
    orders::OrderProxyService,
};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub gateway: Arc<ApiGateway>,
    pub catalog: CatalogStore,
    pub checkout: Arc<CheckoutService>,
    pub orders: Arc<OrderProxyService>,
}

/// Routes under `/api/v1`: the storefront-facing JSON surface.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(handlers::products::product_routes())
        .merge(handlers::checkout::checkout_routes())
}

/// Full application router, minus the middleware stack `main` applies.
pub fn app_router(state: AppState) -> Router {
    handlers::health::mark_started();

    Router::new()
        .route("/", get(|| async { "storefront-api up" }))
        .route("/health", get(handlers::health::health))
        .nest("/api/v1", api_v1_routes())
        // Internal proxy route; path is part of the wire contract with the
        // frontend, so it lives outside the versioned API.
        .route("/api/my-orders", get(handlers::orders::my_orders))
        .merge(openapi::swagger_ui())
        .with_state(state)
}
