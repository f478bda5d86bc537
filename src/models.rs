//! Wire DTOs for the external services this crate consumes.
//!
//! Field names follow the upstream JSON contracts (camelCase, `_id`), so
//! payloads pass through unchanged. Money is always integer minor units.

use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

/// Product projection owned by the external catalog service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[schema(example = json!({
    "id": "d1",
    "name": "Echo Dot (5th Gen)",
    "price": 4999,
    "currency": "usd",
    "description": "The best sounding Echo Dot yet.",
    "image": "https://images.example.com/echo-dot.jpg",
    "rating": 4.5
}))]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Unit price in minor units (cents)
    #[schema(example = 4999)]
    pub price: i64,
    pub currency: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

/// Payload for creating a product through the catalog service.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "Kindle Paperwhite",
    "price": 13999,
    "description": "Now with a 6.8\" display and adjustable warm light.",
    "currency": "usd"
}))]
pub struct NewProduct {
    #[validate(length(min = 1))]
    pub name: String,
    /// Unit price in minor units (cents)
    #[validate(range(min = 1))]
    pub price: i64,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(equal = 3))]
    pub currency: String,
}

/// Order projection owned by the external order service. Read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "stripePaymentIntentId")]
    pub payment_intent_id: String,
    /// Total in minor units (cents)
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub items: Vec<OrderItem>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct OrderItem {
    #[serde(rename = "productId")]
    pub product_id: String,
    pub quantity: i64,
    /// Unit price in minor units (cents)
    pub price: i64,
}

/// Request body for the payment service's intent creation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePaymentIntentRequest {
    /// Total in minor units (cents)
    pub amount: i64,
    pub currency: String,
    /// Metadata bundle forwarded to the provider's webhook notifications
    pub metadata: IntentMetadata,
}

/// Metadata attached to a payment intent for the provider's asynchronous
/// notification mechanism. `items` is a JSON-serialized line item list,
/// matching the provider's string-only metadata values.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IntentMetadata {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub items: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentIntentResponse {
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
}
