pub mod carts;
pub mod checkout;
pub mod orders;
pub mod payment_validation;
pub mod payments;

pub use carts::CartService;
pub use checkout::CheckoutService;
pub use orders::OrderService;
pub use payments::PaymentService;
