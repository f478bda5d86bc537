use crate::AppState;
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Order history for the current session, proxied to the order service.
///
/// Part of the wire contract with the frontend: success is the plain
/// order array, failures are `{"error": "..."}` with the mapped status.
/// An upstream 404 means "no orders yet" and returns an empty list.
#[utoipa::path(
    get,
    path = "/api/my-orders",
    responses(
        (status = 200, description = "Order list (empty when the upstream has none)", body = Vec<crate::models::Order>),
        (status = 401, description = "No access token obtainable for this session"),
        (status = 502, description = "Order service unreachable")
    ),
    tag = "Orders"
)]
pub async fn my_orders(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session_cookie = headers
        .get(http::header::COOKIE)
        .and_then(|v| v.to_str().ok());

    match state.orders.fetch_my_orders(session_cookie).await {
        Ok(orders) => Json(orders).into_response(),
        Err(err) => {
            let status = err.status_code();
            (status, Json(json!({ "error": err.response_message() }))).into_response()
        }
    }
}
