use tracing::{debug, instrument};
use crate::domain::value_objects::{Quantity, UserId};
use crate::Result;
use super::CartService;

// No ceiling: there is no stock model, so increments only stop at u32::MAX.
impl CartService {
    /// Applies a quantity from the +/- controls. Zero or less removes the line.
    #[instrument(skip(self, user), fields(user = %user))]
    pub async fn set_quantity(&self, user: &UserId, item_id: i64, requested: i64) -> Result<()> {
        let quantity = Quantity::from_requested(requested);
        self.mutate(user, || self.store.set_quantity(user, item_id, quantity)).await?;
        debug!(removed = quantity.is_none(), "quantity applied");
        Ok(())
    }

    pub async fn increment(&self, user: &UserId, item_id: i64) -> Result<()> {
        self.step(user, item_id, 1).await
    }

    /// Taking the last unit removes the line.
    pub async fn decrement(&self, user: &UserId, item_id: i64) -> Result<()> {
        self.step(user, item_id, -1).await
    }

    async fn step(&self, user: &UserId, item_id: i64, delta: i64) -> Result<()> {
        self.mutate(user, || async move {
            let Some(item) = self.store.item(user, item_id).await? else { return Ok(()) };
            let requested = i64::from(item.quantity.value()) + delta;
            self.store.set_quantity(user, item_id, Quantity::from_requested(requested)).await
        })
        .await
    }
}
