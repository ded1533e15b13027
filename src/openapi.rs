use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        description = "Shopping carts, cart-to-order checkout, and card payments"
    ),
    paths(
        crate::handlers::carts::create_cart,
        crate::handlers::carts::get_cart,
        crate::handlers::carts::add_item,
        crate::handlers::carts::remove_item,
        crate::handlers::carts::checkout,
        crate::handlers::orders::get_order,
        crate::handlers::orders::update_status,
        crate::handlers::orders::list_user_orders,
        crate::handlers::payments::process_payment,
        crate::handlers::payments::get_payment,
        crate::handlers::payments::get_payment_by_order,
        crate::handlers::payments::refund_payment,
    ),
    components(schemas(
        crate::entities::cart::Model,
        crate::entities::cart_item::Model,
        crate::entities::order::Model,
        crate::entities::order::OrderStatus,
        crate::entities::order_item::Model,
        crate::entities::payment::Model,
        crate::entities::payment::PaymentStatus,
        crate::services::carts::NewCartItem,
        crate::services::carts::CartWithItems,
        crate::services::orders::OrderWithItems,
        crate::services::payments::PaymentRequest,
        crate::services::payments::PaymentResponse,
        crate::handlers::carts::CreateCartRequest,
        crate::handlers::orders::UpdateStatusRequest,
        crate::errors::ErrorResponse,
    )),
    tags(
        (name = "carts", description = "Shopping cart operations"),
        (name = "orders", description = "Order retrieval and lifecycle"),
        (name = "payments", description = "Payment processing and refunds")
    )
)]
pub struct ApiDoc;

/// Swagger UI at /docs backed by the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
