use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Domain events published by the services after a successful mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    CartCreated(Uuid),
    CartItemAdded {
        cart_id: Uuid,
        product_id: String,
    },
    CartItemRemoved {
        cart_id: Uuid,
        product_id: String,
    },
    CheckoutCompleted {
        cart_id: Uuid,
        order_id: Uuid,
    },
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    PaymentCaptured(Uuid),
    PaymentRefunded(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, surfacing channel failures to the caller.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event and logs instead of failing the surrounding request.
    /// Event delivery is best-effort; the database write already committed.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event.clone()).await {
            warn!("Dropping event {:?}: {}", event, e);
        }
    }
}

/// Consumes events off the channel. Downstream integrations hang off this
/// loop; today it records the activity stream in the logs.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::CartCreated(cart_id) => {
                info!(%cart_id, "Cart created");
            }
            Event::CartItemAdded {
                cart_id,
                product_id,
            } => {
                info!(%cart_id, %product_id, "Cart item added");
            }
            Event::CartItemRemoved {
                cart_id,
                product_id,
            } => {
                info!(%cart_id, %product_id, "Cart item removed");
            }
            Event::CheckoutCompleted { cart_id, order_id } => {
                info!(%cart_id, %order_id, "Checkout completed");
            }
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(%order_id, %old_status, %new_status, "Order status changed");
            }
            Event::PaymentCaptured(payment_id) => {
                info!(%payment_id, "Payment captured");
            }
            Event::PaymentRefunded(payment_id) => {
                info!(%payment_id, "Payment refunded");
            }
        }
    }

    error!("Event channel closed; processing loop exiting");
}
