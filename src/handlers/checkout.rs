use crate::handlers::common::success_response;
use crate::services::checkout::CheckoutQuery;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::get,
    Router,
};

/// Header the edge sets after the identity hand-off; absent for guests.
pub const SESSION_USER_HEADER: &str = "x-session-user";

/// Creates the router for checkout endpoints
pub fn checkout_routes() -> Router<AppState> {
    Router::new().route("/checkout", get(resolve_checkout))
}

/// Resolve the checkout screen for one page view.
///
/// Every entry condition (fresh checkout, succeeded redirect, failed
/// redirect) goes through this endpoint; the returned view-model is one
/// of the mutually exclusive checkout screens. Error screens are part of
/// the view-model contract, so the response is 200 either way.
#[utoipa::path(
    get,
    path = "/api/v1/checkout",
    params(CheckoutQuery),
    responses(
        (status = 200, description = "Resolved checkout screen", body = crate::services::checkout::CheckoutScreen)
    ),
    tag = "Checkout"
)]
pub async fn resolve_checkout(
    State(state): State<AppState>,
    Query(query): Query<CheckoutQuery>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let user_id = headers
        .get(SESSION_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());

    let screen = state.checkout.resolve(&query, user_id).await;
    success_response(screen)
}
