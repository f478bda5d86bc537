//! Checkout state machine.
//!
//! Reconciles three entry conditions (fresh checkout, return from a
//! succeeded payment redirect, return from a failed one) into one of the
//! mutually exclusive checkout screens. There is no continuity across the
//! provider's redirect boundary: every request reconstructs the whole
//! flow from the URL's query parameters, so the redirect-derived screens
//! are checked before any fetch logic runs.

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};

use crate::{
    errors::ServiceError,
    models::{CreatePaymentIntentRequest, IntentMetadata},
    services::gateway::ApiGateway,
};

/// Where the success screen navigates once the delay elapses.
const ORDERS_PATH: &str = "/orders";
const HOME_PATH: &str = "/";
/// Delay before the success screen's automatic navigation.
const REDIRECT_DELAY_SECS: u64 = 3;

const INVALID_CART_MESSAGE: &str = "Invalid cart total or missing payment information.";
const FAILED_MESSAGE: &str = "Something went wrong with your payment. Please try again.";
const CONFIG_ERROR_MESSAGE: &str =
    "Configuration Error: payment provider publishable key is missing";

/// Query parameters driving the checkout flow. The payment provider
/// appends `payment_intent_client_secret` and `redirect_status` when it
/// redirects back after confirmation.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct CheckoutQuery {
    /// Unit price in minor units (canonical parameter)
    pub amount: Option<String>,
    /// Deprecated alias for `amount`
    pub price: Option<String>,
    /// Item count, defaults to 1
    pub quantity: Option<String>,
    #[serde(rename = "productId")]
    pub product_id: Option<String>,
    /// 3-letter currency code, defaults to the configured currency
    pub currency: Option<String>,
    pub payment_intent_client_secret: Option<String>,
    pub redirect_status: Option<String>,
}

/// Outcome encoded in the provider's redirect, read once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectOutcome {
    None,
    Succeeded,
    Failed,
}

impl RedirectOutcome {
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("succeeded") => Self::Succeeded,
            Some("failed") => Self::Failed,
            Some(other) => {
                // Other provider statuses (e.g. "processing") fall through
                // to the fresh-checkout path.
                info!(redirect_status = other, "unrecognized redirect status");
                Self::None
            }
            None => Self::None,
        }
    }
}

/// Ephemeral cart state derived entirely from query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckoutIntent {
    pub unit_price_minor: i64,
    pub quantity: i64,
    pub product_id: Option<String>,
    pub currency: String,
}

impl CheckoutIntent {
    pub fn from_query(query: &CheckoutQuery, default_currency: &str) -> Self {
        let amount_param = match (&query.amount, &query.price) {
            (Some(amount), _) => Some(amount.as_str()),
            (None, Some(price)) => {
                warn!("checkout called with deprecated 'price' parameter; use 'amount'");
                Some(price.as_str())
            }
            (None, None) => None,
        };

        // Unparseable values collapse to an invalid cart rather than an
        // input error; the invalid-cart screen handles both.
        let unit_price_minor = amount_param
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0);
        let quantity = match &query.quantity {
            None => 1,
            Some(q) => q.trim().parse::<i64>().unwrap_or(0),
        };

        Self {
            unit_price_minor,
            quantity,
            product_id: query.product_id.clone(),
            currency: query
                .currency
                .clone()
                .unwrap_or_else(|| default_currency.to_string()),
        }
    }

    /// Total in minor units. `None` when the multiplication overflows or
    /// either factor is out of range; always non-negative otherwise.
    pub fn total_minor(&self) -> Option<i64> {
        if self.unit_price_minor < 0 || self.quantity < 0 {
            return None;
        }
        self.unit_price_minor.checked_mul(self.quantity)
    }
}

/// Serialized into the intent metadata for the provider's webhook.
#[derive(Debug, Serialize)]
struct LineItem<'a> {
    #[serde(rename = "productId")]
    product_id: &'a str,
    quantity: i64,
    price: i64,
}

/// View-model for the checkout page: exactly one screen per request.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum CheckoutScreen {
    /// Terminal success: render confirmation and schedule one navigation
    /// to the order listing.
    RedirectSucceeded {
        /// Last 8 characters of the payment secret, as a human-readable
        /// transaction reference
        transaction_reference: String,
        redirect_to: String,
        redirect_after_secs: u64,
    },
    /// Terminal failure: manual return home, no automatic retry.
    RedirectFailed { message: String, home: String },
    /// Deployment misconfiguration, not a runtime fault.
    ConfigError { message: String },
    /// Any recorded error; go-home action.
    Error { message: String, home: String },
    /// Payment secret present: render the hosted payment form.
    Ready {
        client_secret: String,
        publishable_key: String,
        /// Total in minor units
        amount: i64,
        quantity: i64,
        currency: String,
    },
}

type Flight = Arc<Mutex<Option<String>>>;

pub struct CheckoutService {
    gateway: Arc<ApiGateway>,
    publishable_key: Option<String>,
    default_currency: String,
    /// Single-flight guard: concurrent identical fresh checkouts share one
    /// in-flight intent creation instead of racing. Entries live only for
    /// the duration of the creation call.
    inflight: DashMap<CheckoutIntent, Flight>,
}

impl CheckoutService {
    pub fn new(
        gateway: Arc<ApiGateway>,
        publishable_key: Option<String>,
        default_currency: String,
    ) -> Self {
        Self {
            gateway,
            publishable_key,
            default_currency,
            inflight: DashMap::new(),
        }
    }

    /// Resolves the screen for one page view.
    ///
    /// Redirect-derived screens are evaluated first: after the external
    /// redirect the page is re-entered fresh and the URL is the only
    /// continuation state.
    #[instrument(skip(self, query))]
    pub async fn resolve(&self, query: &CheckoutQuery, user_id: Option<&str>) -> CheckoutScreen {
        match RedirectOutcome::from_param(query.redirect_status.as_deref()) {
            RedirectOutcome::Succeeded => {
                let secret = query.payment_intent_client_secret.as_deref().unwrap_or("");
                return CheckoutScreen::RedirectSucceeded {
                    transaction_reference: transaction_reference(secret),
                    redirect_to: ORDERS_PATH.to_string(),
                    redirect_after_secs: REDIRECT_DELAY_SECS,
                };
            }
            RedirectOutcome::Failed => {
                return CheckoutScreen::RedirectFailed {
                    message: FAILED_MESSAGE.to_string(),
                    home: HOME_PATH.to_string(),
                };
            }
            RedirectOutcome::None => {}
        }

        let Some(publishable_key) = self.publishable_key.clone() else {
            return CheckoutScreen::ConfigError {
                message: CONFIG_ERROR_MESSAGE.to_string(),
            };
        };

        let intent = CheckoutIntent::from_query(query, &self.default_currency);
        let total = intent.total_minor().unwrap_or(0);

        // A secret arriving via the URL means the intent already exists;
        // re-render the form against it instead of creating another.
        if let Some(secret) = &query.payment_intent_client_secret {
            return CheckoutScreen::Ready {
                client_secret: secret.clone(),
                publishable_key,
                amount: total,
                quantity: intent.quantity,
                currency: intent.currency,
            };
        }

        if total <= 0 {
            return CheckoutScreen::Error {
                message: INVALID_CART_MESSAGE.to_string(),
                home: HOME_PATH.to_string(),
            };
        }

        match self.create_intent(&intent, total, user_id).await {
            Ok(client_secret) => CheckoutScreen::Ready {
                client_secret,
                publishable_key,
                amount: total,
                quantity: intent.quantity,
                currency: intent.currency,
            },
            Err(err) => CheckoutScreen::Error {
                message: format!(
                    "Failed to load payment system. Is the backend running? ({})",
                    err
                ),
                home: HOME_PATH.to_string(),
            },
        }
    }

    /// Creates a payment intent, collapsing concurrent identical requests
    /// onto one in-flight creation.
    async fn create_intent(
        &self,
        intent: &CheckoutIntent,
        total: i64,
        user_id: Option<&str>,
    ) -> Result<String, ServiceError> {
        let flight: Flight = self
            .inflight
            .entry(intent.clone())
            .or_default()
            .value()
            .clone();

        let mut slot = flight.lock().await;
        if let Some(secret) = slot.as_ref() {
            info!("reusing in-flight payment intent");
            return Ok(secret.clone());
        }

        let line_item = LineItem {
            product_id: intent.product_id.as_deref().unwrap_or("unknown"),
            quantity: intent.quantity,
            price: intent.unit_price_minor,
        };
        let items = serde_json::to_string(&[line_item])
            .map_err(|e| ServiceError::SerializationError(e.to_string()))?;

        let request = CreatePaymentIntentRequest {
            amount: total,
            currency: intent.currency.clone(),
            metadata: IntentMetadata {
                user_id: user_id.unwrap_or("guest").to_string(),
                items,
            },
        };

        let result = self.gateway.create_payment_intent(&request).await;
        // Drop the map entry either way; later page views create fresh
        // intents, and failures stay retryable.
        self.inflight.remove(intent);

        match result {
            Ok(response) => {
                *slot = Some(response.client_secret.clone());
                Ok(response.client_secret)
            }
            Err(err) => Err(err),
        }
    }
}

/// Last 8 characters of the payment secret, uppercased.
fn transaction_reference(secret: &str) -> String {
    let tail: String = secret
        .chars()
        .rev()
        .take(8)
        .collect::<String>()
        .chars()
        .rev()
        .collect();
    tail.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> CheckoutQuery {
        let mut q = CheckoutQuery::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "amount" => q.amount = v,
                "price" => q.price = v,
                "quantity" => q.quantity = v,
                "productId" => q.product_id = v,
                "currency" => q.currency = v,
                "payment_intent_client_secret" => q.payment_intent_client_secret = v,
                "redirect_status" => q.redirect_status = v,
                other => panic!("unknown query key {}", other),
            }
        }
        q
    }

    #[test]
    fn redirect_outcome_parses_known_statuses_only() {
        assert_eq!(
            RedirectOutcome::from_param(Some("succeeded")),
            RedirectOutcome::Succeeded
        );
        assert_eq!(
            RedirectOutcome::from_param(Some("failed")),
            RedirectOutcome::Failed
        );
        assert_eq!(
            RedirectOutcome::from_param(Some("processing")),
            RedirectOutcome::None
        );
        assert_eq!(RedirectOutcome::from_param(None), RedirectOutcome::None);
    }

    #[test]
    fn intent_uses_canonical_amount_over_deprecated_price() {
        let q = query(&[("amount", "4999"), ("price", "100"), ("quantity", "2")]);
        let intent = CheckoutIntent::from_query(&q, "usd");
        assert_eq!(intent.unit_price_minor, 4999);
        assert_eq!(intent.total_minor(), Some(9998));
    }

    #[test]
    fn deprecated_price_alias_still_works() {
        let q = query(&[("price", "13999")]);
        let intent = CheckoutIntent::from_query(&q, "usd");
        assert_eq!(intent.unit_price_minor, 13999);
        assert_eq!(intent.quantity, 1);
    }

    #[test]
    fn unparseable_amount_collapses_to_invalid_cart() {
        let q = query(&[("amount", "not-a-number")]);
        let intent = CheckoutIntent::from_query(&q, "usd");
        assert_eq!(intent.total_minor(), Some(0));
    }

    #[test]
    fn unparseable_quantity_forces_zero_total() {
        let q = query(&[("amount", "4999"), ("quantity", "lots")]);
        let intent = CheckoutIntent::from_query(&q, "usd");
        assert_eq!(intent.total_minor(), Some(0));
    }

    #[test]
    fn negative_amount_is_invalid() {
        let q = query(&[("amount", "-100")]);
        let intent = CheckoutIntent::from_query(&q, "usd");
        assert_eq!(intent.total_minor(), None);
    }

    #[test]
    fn overflowing_total_is_invalid() {
        let q = query(&[("amount", &i64::MAX.to_string()), ("quantity", "2")]);
        let intent = CheckoutIntent::from_query(&q, "usd");
        assert_eq!(intent.total_minor(), None);
    }

    #[test]
    fn currency_defaults_from_config() {
        let q = query(&[("amount", "100")]);
        let intent = CheckoutIntent::from_query(&q, "eur");
        assert_eq!(intent.currency, "eur");
    }

    #[test]
    fn transaction_reference_is_last_eight_uppercased() {
        assert_eq!(
            transaction_reference("pi_3abc_secret_k9xyz12w"),
            "K9XYZ12W"
        );
        assert_eq!(transaction_reference("short"), "SHORT");
        assert_eq!(transaction_reference(""), "");
    }
}
