use crate::handlers::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    errors::ApiError,
    models::NewProduct,
    services::catalog::CatalogStatus,
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};

/// Creates the router for product endpoints
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/:id", get(get_product))
}

/// List all purchasable products
#[utoipa::path(
    get,
    path = "/api/v1/products",
    responses(
        (status = 200, description = "Product list", body = Vec<crate::models::Product>),
        (status = 502, description = "Catalog service unavailable", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state.catalog.fetch_all().await;

    let snapshot = state.catalog.snapshot();
    match snapshot.status {
        CatalogStatus::Error(message) => Err(ApiError::ServiceError(
            crate::errors::ServiceError::ExternalApiError(message),
        )),
        _ => Ok(success_response(snapshot.products)),
    }
}

/// Get a single product
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product", body = crate::models::Product),
        (status = 502, description = "Catalog service unavailable", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .gateway
        .fetch_product(&id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(product))
}

/// Create a product through the catalog service
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = NewProduct,
    responses(
        (status = 201, description = "Product created", body = crate::models::Product),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 502, description = "Catalog service unavailable", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(draft): Json<NewProduct>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&draft)?;

    let created = state.catalog.add(draft).await.map_err(map_service_error)?;
    Ok(created_response(created))
}
