//! Catalog store: process-wide cache of the purchasable product list.
//!
//! An owned state object behind a watch channel rather than a global
//! singleton; handlers clone the store handle and subscribers observe
//! updates. Overlapping `fetch_all` calls are not coordinated: whichever
//! response lands last wins. Single-shot fetch, no retry, no pagination.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::{
    errors::ServiceError,
    models::{NewProduct, Product},
    services::gateway::ApiGateway,
};

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogStatus {
    Idle,
    Loading,
    Loaded,
    Error(String),
}

#[derive(Debug, Clone)]
pub struct CatalogState {
    pub status: CatalogStatus,
    pub products: Vec<Product>,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            status: CatalogStatus::Idle,
            products: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct CatalogStore {
    gateway: Arc<ApiGateway>,
    state: Arc<watch::Sender<CatalogState>>,
}

impl CatalogStore {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        let (tx, _rx) = watch::channel(CatalogState::default());
        Self {
            gateway,
            state: Arc::new(tx),
        }
    }

    /// Subscribe to state updates.
    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.state.subscribe()
    }

    /// Current state snapshot.
    pub fn snapshot(&self) -> CatalogState {
        self.state.borrow().clone()
    }

    /// Fetches the product list and replaces the cached items.
    ///
    /// Failures are recorded in shared state rather than returned; callers
    /// read the status from the snapshot.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self) {
        self.state.send_modify(|s| s.status = CatalogStatus::Loading);

        match self.gateway.fetch_products().await {
            Ok(products) => {
                info!(count = products.len(), "catalog refreshed");
                self.state.send_modify(|s| {
                    s.products = products;
                    s.status = CatalogStatus::Loaded;
                });
            }
            Err(err) => {
                warn!(error = %err, "catalog fetch failed");
                self.state
                    .send_modify(|s| s.status = CatalogStatus::Error(err.to_string()));
            }
        }
    }

    /// Creates a product, then re-fetches the list to resynchronize.
    ///
    /// On failure the error is recorded in shared state *and* returned, so
    /// a form can show a per-field error while the list view shows the
    /// shared one.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn add(&self, draft: NewProduct) -> Result<Product, ServiceError> {
        self.state.send_modify(|s| s.status = CatalogStatus::Loading);

        match self.gateway.create_product(&draft).await {
            Ok(created) => {
                self.fetch_all().await;
                Ok(created)
            }
            Err(err) => {
                warn!(error = %err, "product create failed");
                self.state
                    .send_modify(|s| s.status = CatalogStatus::Error(err.to_string()));
                Err(err)
            }
        }
    }
}
