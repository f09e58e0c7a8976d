//! Domain events
use crate::domain::value_objects::Money;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CartEvent {
    ItemAdded { product_id: String, product_name: String, quantity: u32 },
    OrderPlaced { order_id: Uuid, total: Money },
}

impl CartEvent {
    /// Confirmation text for the transient action message.
    pub fn message(&self) -> String {
        match self {
            Self::ItemAdded { product_name, .. } => format!("Added {product_name} to cart"),
            Self::OrderPlaced { order_id, total } => format!("Order {order_id} placed, total {total}"),
        }
    }
}
