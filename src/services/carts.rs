use crate::entities::{cart, cart_item};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A line to add to a cart. Lines are appended as-is; the same product may
/// be added repeatedly with different selections.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    #[validate(length(min = 1, message = "productId is required"))]
    pub product_id: String,
    #[validate(length(min = 1, message = "productName is required"))]
    pub product_name: String,
    pub unit_price: Decimal,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    #[serde(default)]
    pub selected_size: String,
    #[serde(default)]
    pub selected_color: String,
}

/// Cart header with its line items, flattened into a single JSON object.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartWithItems {
    #[serde(flatten)]
    pub cart: cart::Model,
    pub items: Vec<cart_item::Model>,
}

#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Creates a new empty cart for the given user.
    #[instrument(skip(self))]
    pub async fn create_cart(&self, user_id: &str) -> Result<cart::Model, ServiceError> {
        if user_id.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "userId is required".to_string(),
            ));
        }

        let cart_id = Uuid::new_v4();
        let now = Utc::now();
        let cart = cart::ActiveModel {
            id: Set(cart_id),
            user_id: Set(user_id.to_string()),
            total: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let cart = cart.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CartCreated(cart_id))
            .await;

        info!("Created cart: {}", cart_id);
        Ok(cart)
    }

    /// Fetches a cart and its line items.
    #[instrument(skip(self))]
    pub async fn get_cart(&self, cart_id: Uuid) -> Result<CartWithItems, ServiceError> {
        load_cart_with_items(&*self.db, cart_id).await
    }

    /// Appends a line item and recomputes the cart total inside one
    /// transaction.
    #[instrument(skip(self, item))]
    pub async fn add_item(
        &self,
        cart_id: Uuid,
        item: NewCartItem,
    ) -> Result<CartWithItems, ServiceError> {
        item.validate()?;
        if item.unit_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "unitPrice cannot be negative".to_string(),
            ));
        }

        let product_id = item.product_id.clone();

        let txn = self.db.begin().await?;

        let cart = cart::Entity::find_by_id(cart_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart {} not found", cart_id)))?;

        let line = cart_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            cart_id: Set(cart.id),
            product_id: Set(item.product_id),
            product_name: Set(item.product_name),
            unit_price: Set(item.unit_price),
            quantity: Set(item.quantity),
            selected_size: Set(item.selected_size),
            selected_color: Set(item.selected_color),
            created_at: Set(Utc::now()),
        };
        line.insert(&txn).await?;

        recalculate_total(&txn, cart).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemAdded {
                cart_id,
                product_id: product_id.clone(),
            })
            .await;

        info!("Added product {} to cart {}", product_id, cart_id);
        self.get_cart(cart_id).await
    }

    /// Removes the first line matching the product id, if any, and
    /// recomputes the total. Removing a product that is not in the cart is
    /// a success; only an unknown cart is an error.
    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        cart_id: Uuid,
        product_id: &str,
    ) -> Result<CartWithItems, ServiceError> {
        let txn = self.db.begin().await?;

        let cart = cart::Entity::find_by_id(cart_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart {} not found", cart_id)))?;

        let line = cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .order_by_asc(cart_item::Column::CreatedAt)
            .one(&txn)
            .await?;

        let removed = match line {
            Some(line) => {
                line.delete(&txn).await?;
                recalculate_total(&txn, cart).await?;
                true
            }
            None => false,
        };

        txn.commit().await?;

        if removed {
            self.event_sender
                .send_or_log(Event::CartItemRemoved {
                    cart_id,
                    product_id: product_id.to_string(),
                })
                .await;
            info!("Removed product {} from cart {}", product_id, cart_id);
        }

        self.get_cart(cart_id).await
    }
}

/// Loads a cart header plus its lines, ordered oldest-first.
pub(crate) async fn load_cart_with_items<C: ConnectionTrait>(
    conn: &C,
    cart_id: Uuid,
) -> Result<CartWithItems, ServiceError> {
    let cart = cart::Entity::find_by_id(cart_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Cart {} not found", cart_id)))?;

    let items = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .order_by_asc(cart_item::Column::CreatedAt)
        .all(conn)
        .await?;

    Ok(CartWithItems { cart, items })
}

/// Rewrites the cart total from the full line set. Totals are never
/// adjusted incrementally so a missed update cannot accumulate drift.
async fn recalculate_total<C: ConnectionTrait>(
    conn: &C,
    cart: cart::Model,
) -> Result<cart::Model, ServiceError> {
    let items = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .all(conn)
        .await?;

    let total: Decimal = items
        .iter()
        .map(|line| line.unit_price * Decimal::from(line.quantity))
        .sum();

    let mut active: cart::ActiveModel = cart.into();
    active.total = Set(total);
    active.updated_at = Set(Utc::now());
    Ok(active.update(conn).await?)
}
