//! Cart Aggregate

use serde::{Deserialize, Serialize};
use crate::domain::value_objects::{Money, Quantity, UserId};

/// Catalog fields copied into a cart line at add-time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub product_id: String,
    pub name: String,
    pub price: Money,
    pub image: String,
    pub vendor_id: String,
    pub vendor_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub user_id: UserId,
    pub product: ProductRef,
    pub quantity: Quantity,
    pub selected: bool,
}

impl CartItem {
    pub fn line_total(&self) -> Money { self.product.price.multiply(self.quantity.value()) }
}

/// Values derived from the live item set. Never stored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    pub selected_total: Money,
    pub selected_units: u64,
    pub all_selected: bool,
    pub item_count: usize,
}

impl CartSummary {
    pub fn of(items: &[CartItem]) -> Self {
        let selected = items.iter().filter(|i| i.selected);
        Self {
            selected_total: selected.clone().map(CartItem::line_total).sum(),
            selected_units: selected.map(|i| u64::from(i.quantity.value())).sum(),
            all_selected: !items.is_empty() && items.iter().all(|i| i.selected),
            item_count: items.len(),
        }
    }
}

/// One user's cart as observers see it: the full list plus derived values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    user_id: UserId,
    items: Vec<CartItem>,
    summary: CartSummary,
}

impl Cart {
    pub fn new(user_id: UserId, items: Vec<CartItem>) -> Self {
        let summary = CartSummary::of(&items);
        Self { user_id, items, summary }
    }

    pub fn empty(user_id: UserId) -> Self { Self::new(user_id, vec![]) }

    pub fn user_id(&self) -> &UserId { &self.user_id }
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn selected(&self) -> impl Iterator<Item = &CartItem> { self.items.iter().filter(|i| i.selected) }
    pub fn summary(&self) -> &CartSummary { &self.summary }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn item(&self, id: i64) -> Option<&CartItem> { self.items.iter().find(|i| i.id == id) }
}

#[cfg(test)]
pub(crate) fn sample_item(id: i64, price: i64, qty: u32, selected: bool) -> CartItem {
    CartItem {
        id,
        user_id: UserId::new("u1"),
        product: ProductRef {
            product_id: format!("P{id}"),
            name: format!("Product {id}"),
            price: Money::from_rupiah(price),
            image: String::new(),
            vendor_id: "V1".into(),
            vendor_name: "Warung Bu Sri".into(),
        },
        quantity: Quantity::new(qty).unwrap(),
        selected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_only_selected() {
        let cart = Cart::new(UserId::new("u1"), vec![sample_item(1, 10000, 2, true), sample_item(2, 5000, 1, false)]);
        assert_eq!(cart.summary().selected_total, Money::from_rupiah(20000));
        assert_eq!(cart.summary().selected_units, 2);
        assert_eq!(cart.summary().item_count, 2);
        assert!(!cart.summary().all_selected);
        assert_eq!(cart.selected().count(), 1);
    }

    #[test]
    fn test_all_selected() {
        let cart = Cart::new(UserId::new("u1"), vec![sample_item(1, 10000, 1, true), sample_item(2, 5000, 3, true)]);
        assert!(cart.summary().all_selected);
        assert_eq!(cart.summary().selected_total, Money::from_rupiah(25000));
        assert_eq!(cart.summary().selected_units, 4);
    }

    #[test]
    fn test_empty_cart_is_never_all_selected() {
        let summary = Cart::empty(UserId::guest()).summary().clone();
        assert_eq!(summary, CartSummary::default());
        assert!(!summary.all_selected);
    }

    #[test]
    fn test_summary_saturates_on_extreme_prices() {
        let mut item = sample_item(1, 1, u32::MAX, true);
        item.product.price = Money::new(rust_decimal::Decimal::MAX);
        let summary = CartSummary::of(&[item.clone(), item]);
        assert_eq!(summary.selected_total, Money::new(rust_decimal::Decimal::MAX));
        assert_eq!(summary.selected_units, 2 * u64::from(u32::MAX));
    }
}
