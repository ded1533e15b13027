use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, map_service_error, success_response, validate_input,
};
use crate::services::carts::NewCartItem;
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCartRequest {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
}

/// Create an empty cart
#[utoipa::path(
    post,
    path = "/api/v1/carts",
    request_body = CreateCartRequest,
    responses(
        (status = 201, description = "Cart created", body = crate::entities::cart::Model),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    tag = "carts"
)]
pub async fn create_cart(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCartRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;
    let cart = state
        .services
        .carts
        .create_cart(&payload.user_id)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(cart))
}

/// Fetch a cart with its items
#[utoipa::path(
    get,
    path = "/api/v1/carts/{id}",
    params(("id" = Uuid, Path, description = "Cart id")),
    responses(
        (status = 200, description = "Cart found", body = crate::services::carts::CartWithItems),
        (status = 404, description = "Cart not found", body = crate::errors::ErrorResponse)
    ),
    tag = "carts"
)]
pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let cart = state
        .services
        .carts
        .get_cart(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cart))
}

/// Append a line item to a cart
#[utoipa::path(
    post,
    path = "/api/v1/carts/{id}/items",
    params(("id" = Uuid, Path, description = "Cart id")),
    request_body = NewCartItem,
    responses(
        (status = 200, description = "Updated cart", body = crate::services::carts::CartWithItems),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 404, description = "Cart not found", body = crate::errors::ErrorResponse)
    ),
    tag = "carts"
)]
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewCartItem>,
) -> Result<Response, ApiError> {
    let cart = state
        .services
        .carts
        .add_item(id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cart))
}

/// Remove the first line matching a product id
#[utoipa::path(
    delete,
    path = "/api/v1/carts/{id}/items/{product_id}",
    params(
        ("id" = Uuid, Path, description = "Cart id"),
        ("product_id" = String, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Updated cart", body = crate::services::carts::CartWithItems),
        (status = 404, description = "Cart not found", body = crate::errors::ErrorResponse)
    ),
    tag = "carts"
)]
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    Path((id, product_id)): Path<(Uuid, String)>,
) -> Result<Response, ApiError> {
    let cart = state
        .services
        .carts
        .remove_item(id, &product_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cart))
}

/// Convert a cart into an order (checkout)
#[utoipa::path(
    post,
    path = "/api/v1/carts/{id}/orders",
    params(("id" = Uuid, Path, description = "Cart id")),
    responses(
        (status = 201, description = "Order created", body = crate::entities::order::Model),
        (status = 404, description = "Cart not found", body = crate::errors::ErrorResponse)
    ),
    tag = "carts"
)]
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let order = state
        .services
        .checkout
        .checkout(id)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(order))
}

pub fn carts_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_cart))
        .route("/:id", get(get_cart))
        .route("/:id/items", post(add_item))
        .route("/:id/items/:product_id", delete(remove_item))
        .route("/:id/orders", post(checkout))
}
