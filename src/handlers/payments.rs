use crate::errors::{ApiError, ServiceError};
use crate::handlers::common::{map_service_error, success_response};
use crate::services::payments::{PaymentRequest, PaymentResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

/// Process a card payment
///
/// Validation failures return the wire-level payment envelope with
/// `success: false` and the specific reason, not the generic error body.
#[utoipa::path(
    post,
    path = "/api/v1/payments",
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Payment captured", body = PaymentResponse),
        (status = 400, description = "Validation failed", body = PaymentResponse)
    ),
    tag = "payments"
)]
pub async fn process_payment(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PaymentRequest>,
) -> Result<Response, ApiError> {
    match state.services.payments.process_payment(payload).await {
        Ok(payment) => Ok(success_response(PaymentResponse {
            success: true,
            message: "Payment processed successfully".to_string(),
            payment: Some(payment),
        })),
        Err(ServiceError::ValidationError(message)) => Ok((
            StatusCode::BAD_REQUEST,
            Json(PaymentResponse {
                success: false,
                message,
                payment: None,
            }),
        )
            .into_response()),
        Err(err) => Err(map_service_error(err)),
    }
}

/// Fetch a payment by id
#[utoipa::path(
    get,
    path = "/api/v1/payments/{payment_id}",
    params(("payment_id" = Uuid, Path, description = "Payment id")),
    responses(
        (status = 200, description = "Payment found", body = crate::entities::payment::Model),
        (status = 404, description = "Payment not found", body = crate::errors::ErrorResponse)
    ),
    tag = "payments"
)]
pub async fn get_payment(
    State(state): State<Arc<AppState>>,
    Path(payment_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let payment = state
        .services
        .payments
        .get_payment(payment_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(payment))
}

/// Fetch the payment recorded for an order
#[utoipa::path(
    get,
    path = "/api/v1/payments/order/{order_id}",
    params(("order_id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Payment found", body = crate::entities::payment::Model),
        (status = 404, description = "No payment for order", body = crate::errors::ErrorResponse)
    ),
    tag = "payments"
)]
pub async fn get_payment_by_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let payment = state
        .services
        .payments
        .get_payment_by_order(order_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(payment))
}

/// Refund a payment
#[utoipa::path(
    post,
    path = "/api/v1/payments/{payment_id}/refund",
    params(("payment_id" = Uuid, Path, description = "Payment id")),
    responses(
        (status = 200, description = "Refunded payment", body = crate::entities::payment::Model),
        (status = 404, description = "Payment not found", body = crate::errors::ErrorResponse)
    ),
    tag = "payments"
)]
pub async fn refund_payment(
    State(state): State<Arc<AppState>>,
    Path(payment_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let payment = state
        .services
        .payments
        .refund_payment(payment_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(payment))
}

pub fn payments_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(process_payment))
        .route("/:payment_id", get(get_payment))
        .route("/order/:order_id", get(get_payment_by_order))
        .route("/:payment_id/refund", post(refund_payment))
}
