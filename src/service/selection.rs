use tracing::{debug, instrument};
use crate::domain::value_objects::UserId;
use crate::Result;
use super::CartService;

impl CartService {
    /// Flips one line. Lines that are already gone are ignored.
    #[instrument(skip(self, user), fields(user = %user))]
    pub async fn toggle_selection(&self, user: &UserId, item_id: i64) -> Result<()> {
        self.mutate(user, || self.store.toggle_selection(user, item_id)).await?;
        debug!("selection toggled");
        Ok(())
    }

    #[instrument(skip(self, user), fields(user = %user))]
    pub async fn set_selection(&self, user: &UserId, item_id: i64, selected: bool) -> Result<()> {
        self.mutate(user, || self.store.set_selection(user, item_id, selected)).await
    }

    /// Selects or deselects every line at once. On an empty cart nothing changes.
    #[instrument(skip(self, user), fields(user = %user))]
    pub async fn toggle_select_all(&self, user: &UserId, selected: bool) -> Result<u64> {
        let changed = self.mutate(user, || self.store.set_all_selection(user, selected)).await?;
        debug!(changed, "bulk selection");
        Ok(changed)
    }
}
