use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = r#"
# Storefront backend-for-frontend

Presentation plumbing for the storefront: product browsing, checkout
hand-off to the external payment provider, and order history proxying.
All business logic (catalog, order persistence, payment processing) lives
in external services.

## Checkout contract

`GET /api/v1/checkout` resolves one page view into exactly one screen.
The payment provider redirects back to the same URL with
`payment_intent_client_secret` and `redirect_status` query parameters;
those are the only continuation state across the redirect boundary.
        "#
    ),
    paths(
        crate::handlers::health::health,
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::checkout::resolve_checkout,
        crate::handlers::orders::my_orders,
    ),
    components(schemas(
        crate::models::Product,
        crate::models::NewProduct,
        crate::models::Order,
        crate::models::OrderItem,
        crate::models::CreatePaymentIntentRequest,
        crate::models::IntentMetadata,
        crate::models::PaymentIntentResponse,
        crate::services::checkout::CheckoutScreen,
        crate::errors::ErrorResponse,
        crate::handlers::health::HealthResponse,
    )),
    tags(
        (name = "Products", description = "Catalog browsing and creation"),
        (name = "Checkout", description = "Checkout flow resolution"),
        (name = "Orders", description = "Order history proxy"),
        (name = "Health", description = "Service liveness")
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted at `/docs`, serving the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
