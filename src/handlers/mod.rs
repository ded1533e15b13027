pub mod carts;
pub mod common;
pub mod orders;
pub mod payments;

use crate::services::{CartService, CheckoutService, OrderService, PaymentService};

/// Service bundle handed to every handler through [`crate::AppState`].
#[derive(Clone)]
pub struct AppServices {
    pub carts: CartService,
    pub checkout: CheckoutService,
    pub orders: OrderService,
    pub payments: PaymentService,
}
