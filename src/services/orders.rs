//! Order proxy: bridges the browser session to the external order service
//! without exposing the bearer token to client code. Token retrieval
//! happens only on this side of the boundary; the route itself holds no
//! state across requests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use serde::Deserialize;
use tracing::{error, instrument, warn};

use crate::{config::AppConfig, errors::ServiceError, models::Order};

/// Exchanges the caller's session for an access token via the identity
/// provider's server-side session API.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// `Ok(None)` means no token is obtainable for this session; the
    /// caller fails closed with an unauthorized signal.
    async fn access_token(&self, session_cookie: Option<&str>)
        -> Result<Option<String>, ServiceError>;
}

#[derive(Debug, Deserialize)]
struct SessionTokenBody {
    access_token: Option<String>,
}

/// HTTP implementation against the identity provider's session API.
/// With no provider configured every session resolves to "no token".
pub struct HttpAccessTokenProvider {
    client: reqwest::Client,
    auth_base_url: Option<String>,
}

impl HttpAccessTokenProvider {
    pub fn new(config: &AppConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_client_timeout_secs))
            .build()
            .map_err(|e| {
                ServiceError::InternalError(format!("failed to build HTTP client: {}", e))
            })?;

        if config.auth_base_url.is_none() {
            warn!("auth_base_url is not configured; order history will be unavailable");
        }

        Ok(Self {
            client,
            auth_base_url: config
                .auth_base_url
                .as_ref()
                .map(|u| u.trim_end_matches('/').to_string()),
        })
    }
}

#[async_trait]
impl AccessTokenProvider for HttpAccessTokenProvider {
    async fn access_token(
        &self,
        session_cookie: Option<&str>,
    ) -> Result<Option<String>, ServiceError> {
        let Some(base) = &self.auth_base_url else {
            return Ok(None);
        };
        let Some(cookie) = session_cookie else {
            return Ok(None);
        };

        let response = self
            .client
            .get(format!("{}/session/access-token", base))
            .header(http::header::COOKIE, cookie)
            .send()
            .await
            .map_err(|err| {
                error!(error = %err, "identity provider session request failed");
                ServiceError::ExternalApiError(err.to_string())
            })?;

        // An expired or absent session is "no token", not a fault.
        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ServiceError::ExternalApiError(format!(
                "identity provider error: {}",
                response.status()
            )));
        }

        let body: SessionTokenBody = response
            .json()
            .await
            .map_err(|err| ServiceError::ExternalApiError(err.to_string()))?;
        Ok(body.access_token.filter(|t| !t.is_empty()))
    }
}

/// Per-request translation between the session and the order service.
pub struct OrderProxyService {
    client: reqwest::Client,
    api_base_url: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl OrderProxyService {
    pub fn new(
        config: &AppConfig,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_client_timeout_secs))
            .build()
            .map_err(|e| {
                ServiceError::InternalError(format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    /// Fetches the caller's orders from the order service.
    ///
    /// Fails closed when no token is obtainable; the order service is
    /// never called in that case. An upstream 404 means "no orders yet"
    /// for new accounts and maps to an empty list.
    #[instrument(skip(self, session_cookie))]
    pub async fn fetch_my_orders(
        &self,
        session_cookie: Option<&str>,
    ) -> Result<Vec<Order>, ServiceError> {
        let token = self
            .tokens
            .access_token(session_cookie)
            .await?
            .ok_or_else(|| {
                ServiceError::Unauthorized(
                    "No access token found. User might need to re-login.".to_string(),
                )
            })?;

        let url = format!("{}/orders", self.api_base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .header(http::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|err| {
                error!(%url, error = %err, "order service request failed");
                ServiceError::ExternalApiError(err.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "order service returned an error");

            if status == StatusCode::NOT_FOUND {
                return Ok(Vec::new());
            }
            return Err(ServiceError::UpstreamError {
                status: status.as_u16(),
                message: format!("Backend error: {} {}", status.as_u16(), body),
            });
        }

        response
            .json()
            .await
            .map_err(|err| ServiceError::ExternalApiError(err.to_string()))
    }
}
