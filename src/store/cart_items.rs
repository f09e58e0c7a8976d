use std::str::FromStr;
use rust_decimal::Decimal;
use sqlx::FromRow;
use crate::domain::aggregates::{CartItem, ProductRef};
use crate::domain::value_objects::{Money, Quantity, UserId};
use crate::{CartError, Result};
use super::CartStore;

const COLUMNS: &str =
    "id, user_id, product_id, product_name, product_price, product_image, vendor_id, vendor_name, quantity, selected";

#[derive(Debug, FromRow)]
pub(super) struct CartItemRow {
    id: i64,
    user_id: String,
    product_id: String,
    product_name: String,
    product_price: String,
    product_image: String,
    vendor_id: String,
    vendor_name: String,
    quantity: i64,
    selected: bool,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = CartError;

    fn try_from(row: CartItemRow) -> Result<Self> {
        let price = Decimal::from_str(&row.product_price)
            .map_err(|e| CartError::CorruptRow(format!("cart item {} price '{}': {e}", row.id, row.product_price)))?;
        let quantity = u32::try_from(row.quantity)
            .ok()
            .and_then(Quantity::new)
            .ok_or_else(|| CartError::CorruptRow(format!("cart item {} quantity {}", row.id, row.quantity)))?;
        Ok(CartItem {
            id: row.id,
            user_id: UserId::new(row.user_id),
            product: ProductRef {
                product_id: row.product_id,
                name: row.product_name,
                price: Money::new(price),
                image: row.product_image,
                vendor_id: row.vendor_id,
                vendor_name: row.vendor_name,
            },
            quantity,
            selected: row.selected,
        })
    }
}

pub(super) fn into_items(rows: Vec<CartItemRow>) -> Result<Vec<CartItem>> {
    rows.into_iter().map(CartItem::try_from).collect()
}

impl CartStore {
    /// Inserts a fresh unselected line, or bumps the quantity of the existing
    /// (user, product) line. Snapshot fields of an existing line are kept.
    pub async fn add_or_increment(&self, user: &UserId, product: &ProductRef) -> Result<CartItem> {
        let row = sqlx::query_as::<_, CartItemRow>(&format!(
            "INSERT INTO cart_items (user_id, product_id, product_name, product_price, product_image, vendor_id, vendor_name, quantity, selected) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, 0) \
             ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = MIN(cart_items.quantity + 1, {max}) \
             RETURNING {COLUMNS}",
            max = u32::MAX,
        ))
        .bind(user.as_str())
        .bind(&product.product_id)
        .bind(&product.name)
        .bind(product.price.amount().to_string())
        .bind(&product.image)
        .bind(&product.vendor_id)
        .bind(&product.vendor_name)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    pub async fn items(&self, user: &UserId) -> Result<Vec<CartItem>> {
        let rows = sqlx::query_as::<_, CartItemRow>(&format!("SELECT {COLUMNS} FROM cart_items WHERE user_id = ?1 ORDER BY id"))
            .bind(user.as_str())
            .fetch_all(&self.pool)
            .await?;
        into_items(rows)
    }

    pub async fn selected_items(&self, user: &UserId) -> Result<Vec<CartItem>> {
        let rows = sqlx::query_as::<_, CartItemRow>(&format!(
            "SELECT {COLUMNS} FROM cart_items WHERE user_id = ?1 AND selected = 1 ORDER BY id"
        ))
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await?;
        into_items(rows)
    }

    pub async fn item(&self, user: &UserId, id: i64) -> Result<Option<CartItem>> {
        let row = sqlx::query_as::<_, CartItemRow>(&format!("SELECT {COLUMNS} FROM cart_items WHERE id = ?1 AND user_id = ?2"))
            .bind(id)
            .bind(user.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(CartItem::try_from).transpose()
    }

    /// `None` removes the line. Missing lines are ignored.
    pub async fn set_quantity(&self, user: &UserId, id: i64, quantity: Option<Quantity>) -> Result<()> {
        match quantity {
            None => self.remove(user, id).await,
            Some(q) => {
                sqlx::query("UPDATE cart_items SET quantity = ?1 WHERE id = ?2 AND user_id = ?3")
                    .bind(i64::from(q.value()))
                    .bind(id)
                    .bind(user.as_str())
                    .execute(&self.pool)
                    .await?;
                Ok(())
            }
        }
    }

    pub async fn remove(&self, user: &UserId, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM cart_items WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn clear_all(&self, user: &UserId) -> Result<u64> {
        let done = sqlx::query("DELETE FROM cart_items WHERE user_id = ?1").bind(user.as_str()).execute(&self.pool).await?;
        Ok(done.rows_affected())
    }

    pub async fn clear_selected(&self, user: &UserId) -> Result<u64> {
        let done = sqlx::query("DELETE FROM cart_items WHERE user_id = ?1 AND selected = 1")
            .bind(user.as_str())
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected())
    }

    pub async fn set_selection(&self, user: &UserId, id: i64, selected: bool) -> Result<()> {
        sqlx::query("UPDATE cart_items SET selected = ?1 WHERE id = ?2 AND user_id = ?3")
            .bind(selected)
            .bind(id)
            .bind(user.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Flips the flag in place, so a stale client view cannot double-toggle.
    pub async fn toggle_selection(&self, user: &UserId, id: i64) -> Result<()> {
        sqlx::query("UPDATE cart_items SET selected = NOT selected WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// One statement, so readers see all lines flipped or none.
    pub async fn set_all_selection(&self, user: &UserId, selected: bool) -> Result<u64> {
        let done = sqlx::query("UPDATE cart_items SET selected = ?1 WHERE user_id = ?2")
            .bind(selected)
            .bind(user.as_str())
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> CartStore { CartStore::connect("sqlite::memory:", 1).await.unwrap() }

    fn product(id: &str, price: i64) -> ProductRef {
        ProductRef {
            product_id: id.into(),
            name: format!("Keripik {id}"),
            price: Money::from_rupiah(price),
            image: format!("https://img.example/{id}.jpg"),
            vendor_id: "V1".into(),
            vendor_name: "Warung Bu Sri".into(),
        }
    }

    #[tokio::test]
    async fn test_add_twice_increments_one_row() {
        let store = store().await;
        let user = UserId::new("u1");
        let first = store.add_or_increment(&user, &product("P1", 10000)).await.unwrap();
        let second = store.add_or_increment(&user, &product("P1", 10000)).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.quantity.value(), 2);
        assert!(!second.selected);
        assert_eq!(store.items(&user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_carts_are_partitioned_by_user() {
        let store = store().await;
        let alice = UserId::new("alice");
        store.add_or_increment(&alice, &product("P1", 10000)).await.unwrap();
        let guest_line = store.add_or_increment(&UserId::guest(), &product("P1", 10000)).await.unwrap();
        assert_eq!(guest_line.quantity.value(), 1);
        store.remove(&alice, guest_line.id).await.unwrap();
        assert_eq!(store.items(&UserId::guest()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_quantity_none_removes() {
        let store = store().await;
        let user = UserId::new("u1");
        let item = store.add_or_increment(&user, &product("P1", 10000)).await.unwrap();
        store.set_quantity(&user, item.id, Quantity::new(5)).await.unwrap();
        assert_eq!(store.item(&user, item.id).await.unwrap().unwrap().quantity.value(), 5);
        store.set_quantity(&user, item.id, None).await.unwrap();
        assert!(store.item(&user, item.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_writes_to_missing_ids_are_noops() {
        let store = store().await;
        let user = UserId::new("u1");
        store.set_quantity(&user, 42, Quantity::new(3)).await.unwrap();
        store.set_selection(&user, 42, true).await.unwrap();
        store.toggle_selection(&user, 42).await.unwrap();
        store.remove(&user, 42).await.unwrap();
        assert!(store.items(&user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_selection_and_clear_selected() {
        let store = store().await;
        let user = UserId::new("u1");
        let a = store.add_or_increment(&user, &product("A", 10000)).await.unwrap();
        let b = store.add_or_increment(&user, &product("B", 5000)).await.unwrap();
        store.toggle_selection(&user, a.id).await.unwrap();
        assert_eq!(store.selected_items(&user).await.unwrap().len(), 1);
        assert_eq!(store.clear_selected(&user).await.unwrap(), 1);
        let left = store.items(&user).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, b.id);
        assert_eq!(store.set_all_selection(&user, true).await.unwrap(), 1);
        assert!(store.items(&user).await.unwrap().iter().all(|i| i.selected));
        assert_eq!(store.clear_all(&user).await.unwrap(), 1);
    }
}
