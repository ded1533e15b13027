use crate::entities::{cart, cart_item, order, order_item};
use crate::entities::order::OrderStatus;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Converts a cart into an order. The one atomic state transition in the
/// system: the order appears and the cart disappears together, or neither
/// happens.
#[derive(Clone)]
pub struct CheckoutService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CheckoutService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self))]
    pub async fn checkout(&self, cart_id: Uuid) -> Result<order::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let order = convert_cart(&txn, cart_id).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CheckoutCompleted {
                cart_id,
                order_id: order.id,
            })
            .await;

        info!("Checked out cart {} into order {}", cart_id, order.id);
        Ok(order)
    }
}

/// Runs the conversion against the given connection, normally an open
/// transaction:
/// - insert the order header (total copied verbatim, status pending)
/// - snapshot every cart line into an order line, no recomputation
/// - delete the cart lines and the cart header
///
/// After the surrounding transaction commits the cart id is permanently
/// invalid for cart operations.
pub(crate) async fn convert_cart<C: ConnectionTrait>(
    conn: &C,
    cart_id: Uuid,
) -> Result<order::Model, ServiceError> {
    let cart = cart::Entity::find_by_id(cart_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Cart {} not found", cart_id)))?;

    let lines = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .order_by_asc(cart_item::Column::CreatedAt)
        .all(conn)
        .await?;

    let order_id = Uuid::new_v4();
    let now = Utc::now();
    let header = order::ActiveModel {
        id: Set(order_id),
        user_id: Set(cart.user_id.clone()),
        total: Set(cart.total),
        status: Set(OrderStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let header = header.insert(conn).await?;

    for line in &lines {
        let snapshot = order_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_id: Set(line.product_id.clone()),
            product_name: Set(line.product_name.clone()),
            unit_price: Set(line.unit_price),
            quantity: Set(line.quantity),
            selected_size: Set(line.selected_size.clone()),
            selected_color: Set(line.selected_color.clone()),
            // keep the original line timestamp so item ordering survives
            created_at: Set(line.created_at),
        };
        snapshot.insert(conn).await?;
    }

    cart_item::Entity::delete_many()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .exec(conn)
        .await?;
    cart.delete(conn).await?;

    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::{ConnectOptions, Database, DatabaseConnection};
    use sea_orm_migration::MigratorTrait;

    async fn test_db() -> DatabaseConnection {
        // A pooled in-memory SQLite gives every connection its own database,
        // so pin the pool to a single connection.
        let mut opts = ConnectOptions::new("sqlite::memory:".to_string());
        opts.max_connections(1).sqlx_logging(false);
        let db = Database::connect(opts).await.unwrap();
        crate::migrator::Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn seed_cart(db: &DatabaseConnection) -> Uuid {
        let cart_id = Uuid::new_v4();
        let now = Utc::now();
        cart::ActiveModel {
            id: Set(cart_id),
            user_id: Set("u1".into()),
            total: Set(dec!(200)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .unwrap();

        cart_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            cart_id: Set(cart_id),
            product_id: Set("p1".into()),
            product_name: Set("Sneaker".into()),
            unit_price: Set(dec!(100)),
            quantity: Set(2),
            selected_size: Set("42".into()),
            selected_color: Set("black".into()),
            created_at: Set(now),
        }
        .insert(db)
        .await
        .unwrap();

        cart_id
    }

    #[tokio::test]
    async fn convert_copies_totals_and_clears_cart() {
        let db = test_db().await;
        let cart_id = seed_cart(&db).await;

        let txn = db.begin().await.unwrap();
        let order = convert_cart(&txn, cart_id).await.unwrap();
        txn.commit().await.unwrap();

        assert_eq!(order.total, dec!(200));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.user_id, "u1");

        assert!(cart::Entity::find_by_id(cart_id)
            .one(&db)
            .await
            .unwrap()
            .is_none());
        assert!(cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .all(&db)
            .await
            .unwrap()
            .is_empty());

        let lines = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order.id))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_id, "p1");
        assert_eq!(lines[0].unit_price, dec!(100));
        assert_eq!(lines[0].quantity, 2);
    }

    #[tokio::test]
    async fn rollback_leaves_cart_intact_and_no_order() {
        let db = test_db().await;
        let cart_id = seed_cart(&db).await;

        // Simulate a failure after the order insert by rolling the
        // transaction back instead of committing.
        let txn = db.begin().await.unwrap();
        let order = convert_cart(&txn, cart_id).await.unwrap();
        let order_id = order.id;
        txn.rollback().await.unwrap();

        let cart = cart::Entity::find_by_id(cart_id)
            .one(&db)
            .await
            .unwrap()
            .expect("cart must survive the rollback");
        assert_eq!(cart.total, dec!(200));

        let lines = cart_item::Entity::find()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(lines.len(), 1);

        assert!(order::Entity::find_by_id(order_id)
            .one(&db)
            .await
            .unwrap()
            .is_none());
        assert!(order::Entity::find().all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_cart_is_not_found() {
        let db = test_db().await;
        let txn = db.begin().await.unwrap();
        let err = convert_cart(&txn, Uuid::new_v4()).await.unwrap_err();
        txn.rollback().await.unwrap();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
