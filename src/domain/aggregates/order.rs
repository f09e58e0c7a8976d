//! Order Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::aggregates::cart::CartItem;
use crate::domain::events::CartEvent;
use crate::domain::value_objects::{Money, PaymentMethod, UserId};

/// Purchase-relevant fields of a cart line, frozen at checkout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub product_id: String,
    pub product_name: String,
    pub product_price: Money,
    pub product_image: String,
    pub vendor_id: String,
    pub vendor_name: String,
    pub quantity: u32,
}

impl OrderLineItem {
    pub fn line_total(&self) -> Money { self.product_price.multiply(self.quantity) }
}

impl From<&CartItem> for OrderLineItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product.product_id.clone(),
            product_name: item.product.name.clone(),
            product_price: item.product.price,
            product_image: item.product.image.clone(),
            vendor_id: item.product.vendor_id.clone(),
            vendor_name: item.product.vendor_name.clone(),
            quantity: item.quantity.value(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus { #[default] Completed }

impl OrderStatus {
    pub fn as_str(&self) -> &'static str { match self { Self::Completed => "completed" } }
    pub fn parse(value: &str) -> Option<Self> { (value == "completed").then_some(Self::Completed) }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    id: Uuid,
    user_id: UserId,
    line_items: Vec<OrderLineItem>,
    total: Money,
    payment_method: PaymentMethod,
    created_at: DateTime<Utc>,
    status: OrderStatus,
    #[serde(skip)]
    events: Vec<CartEvent>,
}

impl Order {
    /// Builds the order for a checkout from the selected-item snapshot.
    pub fn place(
        id: Uuid,
        user_id: UserId,
        selected: &[CartItem],
        payment_method: PaymentMethod,
        created_at: DateTime<Utc>,
    ) -> Result<Self, OrderError> {
        if selected.is_empty() { return Err(OrderError::NothingSelected); }
        let line_items: Vec<OrderLineItem> = selected.iter().map(OrderLineItem::from).collect();
        let total = line_items.iter().map(OrderLineItem::line_total).sum();
        let mut order = Self {
            id, user_id, line_items, total, payment_method, created_at,
            status: OrderStatus::Completed, events: vec![],
        };
        order.raise_event(CartEvent::OrderPlaced { order_id: id, total });
        Ok(order)
    }

    /// Rehydrates a persisted order. The stored total is kept as-is.
    pub fn restore(
        id: Uuid,
        user_id: UserId,
        line_items: Vec<OrderLineItem>,
        total: Money,
        payment_method: PaymentMethod,
        created_at: DateTime<Utc>,
        status: OrderStatus,
    ) -> Self {
        Self { id, user_id, line_items, total, payment_method, created_at, status, events: vec![] }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn user_id(&self) -> &UserId { &self.user_id }
    pub fn line_items(&self) -> &[OrderLineItem] { &self.line_items }
    pub fn total(&self) -> Money { self.total }
    pub fn payment_method(&self) -> PaymentMethod { self.payment_method }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn status(&self) -> OrderStatus { self.status }

    /// Line items grouped by vendor, vendors in order of first appearance.
    pub fn lines_by_vendor(&self) -> Vec<(&str, Vec<&OrderLineItem>)> {
        let mut groups: Vec<(&str, Vec<&OrderLineItem>)> = Vec::new();
        for line in &self.line_items {
            match groups.iter_mut().find(|(vendor, _)| *vendor == line.vendor_name) {
                Some((_, lines)) => lines.push(line),
                None => groups.push((line.vendor_name.as_str(), vec![line])),
            }
        }
        groups
    }

    pub fn encode_line_items(&self) -> serde_json::Result<String> { serde_json::to_string(&self.line_items) }

    /// Legacy or corrupt payloads decode to an empty list.
    pub fn decode_line_items(raw: &str) -> Vec<OrderLineItem> {
        serde_json::from_str(raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "unreadable order line items, showing none");
            Vec::new()
        })
    }

    pub fn take_events(&mut self) -> Vec<CartEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: CartEvent) { self.events.push(e); }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum OrderError { NothingSelected }
impl std::error::Error for OrderError {}
impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self { Self::NothingSelected => write!(f, "nothing selected for checkout") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::cart::sample_item;

    #[test]
    fn test_place_freezes_total() {
        let selected = vec![sample_item(1, 10000, 2, true)];
        let mut order = Order::place(Uuid::new_v4(), UserId::new("u1"), &selected, PaymentMethod::CashOnDelivery, Utc::now()).unwrap();
        assert_eq!(order.total(), Money::from_rupiah(20000));
        assert_eq!(order.line_items().len(), 1);
        assert_eq!(order.line_items()[0].quantity, 2);
        assert_eq!(order.status(), OrderStatus::Completed);
        assert_eq!(order.take_events().len(), 1);
        assert!(order.take_events().is_empty());
    }

    #[test]
    fn test_place_rejects_empty_selection() {
        let err = Order::place(Uuid::new_v4(), UserId::guest(), &[], PaymentMethod::Ovo, Utc::now()).unwrap_err();
        assert_eq!(err, OrderError::NothingSelected);
    }

    #[test]
    fn test_decode_tolerates_garbage() {
        assert!(Order::decode_line_items("not json").is_empty());
        assert!(Order::decode_line_items("{\"legacy\":true}").is_empty());
        assert!(Order::decode_line_items("").is_empty());
    }

    #[test]
    fn test_line_items_survive_encoding() {
        let selected = vec![sample_item(1, 10000, 2, true), sample_item(2, 7500, 1, true)];
        let order = Order::place(Uuid::new_v4(), UserId::new("u1"), &selected, PaymentMethod::BankBca, Utc::now()).unwrap();
        let raw = order.encode_line_items().unwrap();
        assert_eq!(Order::decode_line_items(&raw), order.line_items());
    }

    #[test]
    fn test_lines_grouped_by_vendor() {
        let mut other = sample_item(2, 3000, 1, true);
        other.product.vendor_name = "Kopi Pak Budi".into();
        let selected = vec![sample_item(1, 10000, 1, true), other, sample_item(3, 2000, 4, true)];
        let order = Order::place(Uuid::new_v4(), UserId::new("u1"), &selected, PaymentMethod::Dana, Utc::now()).unwrap();
        let groups = order.lines_by_vendor();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "Warung Bu Sri");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "Kopi Pak Budi");
    }
}
