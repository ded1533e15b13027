pub mod cart;
pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod payment;

pub use cart::Entity as Cart;
pub use cart_item::Entity as CartItem;
pub use order::Entity as Order;
pub use order_item::Entity as OrderItem;
pub use payment::Entity as Payment;

pub use cart::Model as CartModel;
pub use order::Model as OrderModel;
pub use payment::Model as PaymentModel;
