use crate::entities::payment;
use crate::entities::payment::PaymentStatus;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::payment_validation::{
    card_last_four, validate_card_number, validate_cvv, validate_expiry_date,
};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Card payment submission. Transient; only the derived last four digits
/// and the authorization reference are persisted.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub order_id: Uuid,
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    #[validate(length(min = 1, message = "cardNumber is required"))]
    pub card_number: String,
    #[serde(default)]
    pub card_holder: String,
    #[validate(length(min = 1, message = "expiryDate is required"))]
    pub expiry_date: String,
    #[validate(length(min = 1, message = "cvv is required"))]
    pub cvv: String,
}

/// Wire shape of every POST /payments outcome, success or failure.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<payment::Model>,
}

/// Seam for obtaining an authorization reference. The reference is opaque;
/// the service stores it verbatim and never parses it.
#[async_trait]
pub trait PaymentAuthorizer: Send + Sync {
    async fn authorize(&self, request: &PaymentRequest) -> Result<String, ServiceError>;
}

/// Issues locally generated references. Stands in for an external gateway.
#[derive(Debug, Default)]
pub struct LocalAuthorizer;

#[async_trait]
impl PaymentAuthorizer for LocalAuthorizer {
    async fn authorize(&self, _request: &PaymentRequest) -> Result<String, ServiceError> {
        Ok(format!("txn_{}", Uuid::new_v4().simple()))
    }
}

#[derive(Clone)]
pub struct PaymentService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    authorizer: Arc<dyn PaymentAuthorizer>,
    default_currency: String,
}

impl PaymentService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        authorizer: Arc<dyn PaymentAuthorizer>,
        default_currency: String,
    ) -> Self {
        Self {
            db,
            event_sender,
            authorizer,
            default_currency,
        }
    }

    /// Validates the card data, obtains an authorization reference, and
    /// persists a completed payment. Nothing is written when any check
    /// fails; the error carries the specific reason.
    #[instrument(skip(self, request))]
    pub async fn process_payment(
        &self,
        request: PaymentRequest,
    ) -> Result<payment::Model, ServiceError> {
        request.validate()?;

        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Amount must be greater than zero".to_string(),
            ));
        }
        validate_card_number(&request.card_number)
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        validate_expiry_date(&request.expiry_date)
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        validate_cvv(&request.cvv).map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let last_four = card_last_four(&request.card_number);
        let transaction_id = self.authorizer.authorize(&request).await?;

        let currency = request
            .currency
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| self.default_currency.clone());

        let now = Utc::now();
        let record = payment::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(request.order_id),
            amount: Set(request.amount),
            currency: Set(currency),
            status: Set(PaymentStatus::Completed),
            card_last_four: Set(last_four),
            transaction_id: Set(transaction_id),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let record = record.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::PaymentCaptured(record.id))
            .await;

        info!("Captured payment {} for order {}", record.id, record.order_id);
        Ok(record)
    }

    #[instrument(skip(self))]
    pub async fn get_payment(&self, payment_id: Uuid) -> Result<payment::Model, ServiceError> {
        payment::Entity::find_by_id(payment_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Payment {} not found", payment_id)))
    }

    /// Latest payment recorded for an order. One-payment-per-order is
    /// enforced here at read time, not as a storage constraint.
    #[instrument(skip(self))]
    pub async fn get_payment_by_order(
        &self,
        order_id: Uuid,
    ) -> Result<payment::Model, ServiceError> {
        payment::Entity::find()
            .filter(payment::Column::OrderId.eq(order_id))
            .order_by_desc(payment::Column::CreatedAt)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("No payment found for order {}", order_id))
            })
    }

    /// Marks a payment refunded. Refunding an already-refunded payment is
    /// a no-op success.
    #[instrument(skip(self))]
    pub async fn refund_payment(&self, payment_id: Uuid) -> Result<payment::Model, ServiceError> {
        let record = self.get_payment(payment_id).await?;

        if record.status == PaymentStatus::Refunded {
            return Ok(record);
        }

        let mut active: payment::ActiveModel = record.into();
        active.status = Set(PaymentStatus::Refunded);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::PaymentRefunded(payment_id))
            .await;

        info!("Refunded payment {}", payment_id);
        Ok(updated)
    }
}
