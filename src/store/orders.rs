use std::str::FromStr;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;
use crate::domain::aggregates::{CartItem, Order, OrderStatus};
use crate::domain::value_objects::{Money, PaymentMethod, UserId};
use crate::{CartError, Result};
use super::cart_items::{into_items, CartItemRow};
use super::CartStore;

#[derive(Debug, FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    line_items: String,
    total_amount: String,
    payment_method: String,
    created_at: i64,
    status: String,
}

impl TryFrom<OrderRow> for Order {
    type Error = CartError;

    fn try_from(row: OrderRow) -> Result<Self> {
        let corrupt = |what: &str| CartError::CorruptRow(format!("order {} {what}", row.id));
        let id = Uuid::parse_str(&row.id).map_err(|_| corrupt("id"))?;
        let total = Decimal::from_str(&row.total_amount).map_err(|_| corrupt("total_amount"))?;
        let payment_method = PaymentMethod::parse(&row.payment_method).map_err(|_| corrupt("payment_method"))?;
        let created_at = DateTime::<Utc>::from_timestamp_millis(row.created_at).ok_or_else(|| corrupt("created_at"))?;
        let status = OrderStatus::parse(&row.status).ok_or_else(|| corrupt("status"))?;
        Ok(Order::restore(
            id,
            UserId::new(row.user_id),
            Order::decode_line_items(&row.line_items),
            Money::new(total),
            payment_method,
            created_at,
            status,
        ))
    }
}

const COLUMNS: &str = "id, user_id, line_items, total_amount, payment_method, created_at, status";

impl CartStore {
    /// Checkout in one transaction: take the selected lines out of the cart,
    /// build the order from exactly those lines, persist it. Any error rolls
    /// the whole thing back and leaves the cart untouched.
    pub async fn checkout_selected<F>(&self, user: &UserId, build: F) -> Result<Order>
    where
        F: FnOnce(&[CartItem]) -> Result<Order>,
    {
        let mut tx = self.pool.begin().await?;

        // deleting first takes the write lock before anything is read
        let rows = sqlx::query_as::<_, CartItemRow>(
            "DELETE FROM cart_items WHERE user_id = ?1 AND selected = 1 \
             RETURNING id, user_id, product_id, product_name, product_price, product_image, vendor_id, vendor_name, quantity, selected",
        )
        .bind(user.as_str())
        .fetch_all(&mut *tx)
        .await?;
        let mut selected = into_items(rows)?;
        selected.sort_by_key(|i| i.id);

        let order = build(&selected)?;
        let line_items = order.encode_line_items()?;

        let inserted = sqlx::query(
            "INSERT INTO orders (id, user_id, line_items, total_amount, payment_method, created_at, status) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) ON CONFLICT (id) DO NOTHING",
        )
        .bind(order.id().to_string())
        .bind(order.user_id().as_str())
        .bind(line_items)
        .bind(order.total().amount().to_string())
        .bind(order.payment_method().label())
        .bind(order.created_at().timestamp_millis())
        .bind(order.status().as_str())
        .execute(&mut *tx)
        .await?;
        if inserted.rows_affected() == 0 {
            // dropping tx rolls the cart delete back
            tracing::warn!(order_id = %order.id(), "order id already stored, checkout rolled back");
            return Err(CartError::DuplicateOrder(order.id()));
        }

        tx.commit().await?;
        Ok(order)
    }

    /// A user's orders, newest first. Rows that no longer parse are skipped.
    pub async fn orders(&self, user: &UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {COLUMNS} FROM orders WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match Order::try_from(row) {
                Ok(order) => Some(order),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable order");
                    None
                }
            })
            .collect())
    }

    pub async fn order(&self, user: &UserId, id: Uuid) -> Result<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("SELECT {COLUMNS} FROM orders WHERE id = ?1 AND user_id = ?2"))
            .bind(id.to_string())
            .bind(user.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Order::try_from).transpose()
    }

    /// Returns whether a row was deleted.
    pub async fn delete_order(&self, user: &UserId, id: Uuid) -> Result<bool> {
        let done = sqlx::query("DELETE FROM orders WHERE id = ?1 AND user_id = ?2")
            .bind(id.to_string())
            .bind(user.as_str())
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}
