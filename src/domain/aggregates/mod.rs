//! Aggregates module
pub mod cart;
pub mod order;

pub use cart::{Cart, CartItem, CartSummary, ProductRef};
pub use order::{Order, OrderError, OrderLineItem, OrderStatus};
