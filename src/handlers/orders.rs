use crate::errors::ApiError;
use crate::handlers::common::{map_service_error, success_response};
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::Response,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Fetch an order with its item snapshot
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order found", body = crate::services::orders::OrderWithItems),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let order = state
        .services
        .orders
        .get_order(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(order))
}

/// Update an order's status
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated order", body = crate::entities::order::Model),
        (status = 400, description = "Unknown status or disallowed transition", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Response, ApiError> {
    let order = state
        .services
        .orders
        .update_status(id, &payload.status)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(order))
}

/// List a user's orders, most recent first
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/orders",
    params(("user_id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Order headers", body = [crate::entities::order::Model])
    ),
    tag = "orders"
)]
pub async fn list_user_orders(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let orders = state
        .services
        .orders
        .list_orders_by_user(&user_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(orders))
}

pub fn orders_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/:id", get(get_order))
        .route("/:id/status", put(update_status))
}

pub fn user_orders_routes() -> Router<Arc<AppState>> {
    Router::new().route("/:user_id/orders", get(list_user_orders))
}
