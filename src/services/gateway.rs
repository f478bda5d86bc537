//! API gateway client: the single typed request path every outbound call
//! to the backend goes through.
//!
//! Endpoints beginning with `/api/` are internal routes served by this
//! application and resolve against its own origin; everything else
//! resolves against the remote API base URL. Non-2xx responses are
//! normalized into one uniform error kind carrying either the server's
//! `message` field or a formatted status fallback.

use std::time::Duration;

use http::{Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{error, instrument, warn};

use crate::{
    config::AppConfig,
    errors::ServiceError,
    models::{CreatePaymentIntentRequest, NewProduct, Order, PaymentIntentResponse, Product},
};

/// Reserved marker: endpoints with this prefix are this application's own
/// backend routes, not the remote API's.
const INTERNAL_PREFIX: &str = "/api/";

/// Error body shape the backend returns on failures.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

pub struct ApiGateway {
    client: reqwest::Client,
    api_base_url: String,
    internal_base_url: String,
}

impl ApiGateway {
    pub fn new(config: &AppConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_client_timeout_secs))
            .build()
            .map_err(|e| {
                ServiceError::InternalError(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            internal_base_url: config.internal_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolves an endpoint path to a full URL.
    pub fn resolve(&self, endpoint: &str) -> String {
        if endpoint.starts_with(INTERNAL_PREFIX) {
            format!("{}{}", self.internal_base_url, endpoint)
        } else {
            format!("{}{}", self.api_base_url, endpoint)
        }
    }

    /// Issues a request and normalizes the outcome.
    ///
    /// Returns `Ok(None)` for 204 No Content, `Ok(Some(body))` otherwise.
    /// Network failures and non-2xx statuses both surface as
    /// `ServiceError::ExternalApiError`, logged with method and URL before
    /// being returned to the caller.
    #[instrument(skip(self, body, method), fields(method = %method))]
    async fn request<B, T>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<Option<T>, ServiceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.resolve(endpoint);

        let mut builder = self
            .client
            .request(method.clone(), &url)
            .header(http::header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|err| {
            error!(%method, %url, error = %err, "API request failed");
            ServiceError::ExternalApiError(err.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| {
                    format!(
                        "API Error: {} {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or("Unknown")
                    )
                });
            error!(%method, %url, status = status.as_u16(), %message, "API request returned an error");
            return Err(ServiceError::ExternalApiError(message));
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let parsed = response.json::<T>().await.map_err(|err| {
            warn!(%method, %url, error = %err, "failed to parse API response body");
            ServiceError::ExternalApiError(err.to_string())
        })?;
        Ok(Some(parsed))
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Option<T>, ServiceError> {
        self.request::<(), T>(Method::GET, endpoint, None).await
    }

    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<Option<T>, ServiceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, endpoint, Some(body)).await
    }

    fn require<T>(body: Option<T>, what: &str) -> Result<T, ServiceError> {
        body.ok_or_else(|| {
            ServiceError::ExternalApiError(format!("empty response from {}", what))
        })
    }

    // Typed wrappers mirroring the backend surface

    pub async fn fetch_products(&self) -> Result<Vec<Product>, ServiceError> {
        Self::require(self.get("/products").await?, "catalog service")
    }

    pub async fn fetch_product(&self, id: &str) -> Result<Product, ServiceError> {
        Self::require(
            self.get(&format!("/products/{}", id)).await?,
            "catalog service",
        )
    }

    pub async fn create_product(&self, draft: &NewProduct) -> Result<Product, ServiceError> {
        Self::require(self.post("/products", draft).await?, "catalog service")
    }

    pub async fn create_payment_intent(
        &self,
        request: &CreatePaymentIntentRequest,
    ) -> Result<PaymentIntentResponse, ServiceError> {
        Self::require(
            self.post("/payments/create-payment-intent", request).await?,
            "payment service",
        )
    }

    /// Reads back through this application's own proxy route.
    pub async fn fetch_my_orders(&self) -> Result<Vec<Order>, ServiceError> {
        Self::require(self.get("/api/my-orders").await?, "order proxy")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[test]
    fn internal_endpoints_resolve_to_own_origin() {
        let mut cfg = test_config();
        cfg.api_base_url = "https://api.example.com".into();
        cfg.internal_base_url = "https://shop.example.com".into();
        let gateway = ApiGateway::new(&cfg).unwrap();

        assert_eq!(
            gateway.resolve("/api/my-orders"),
            "https://shop.example.com/api/my-orders"
        );
        assert_eq!(
            gateway.resolve("/products"),
            "https://api.example.com/products"
        );
    }

    #[test]
    fn trailing_slashes_in_base_urls_are_normalized() {
        let mut cfg = test_config();
        cfg.api_base_url = "https://api.example.com/".into();
        let gateway = ApiGateway::new(&cfg).unwrap();

        assert_eq!(
            gateway.resolve("/products"),
            "https://api.example.com/products"
        );
    }
}
