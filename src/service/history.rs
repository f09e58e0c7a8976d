use tracing::{debug, instrument};
use uuid::Uuid;
use crate::domain::aggregates::Order;
use crate::domain::value_objects::UserId;
use crate::Result;
use super::CartService;

impl CartService {
    /// Past orders for a user, newest first. Empty when there are none.
    #[instrument(skip(self, user), fields(user = %user))]
    pub async fn order_history(&self, user: &UserId) -> Result<Vec<Order>> {
        self.store.orders(user).await
    }

    pub async fn order(&self, user: &UserId, order_id: Uuid) -> Result<Option<Order>> {
        self.store.order(user, order_id).await
    }

    /// Deleting an order that does not exist is not an error.
    #[instrument(skip(self, user), fields(user = %user))]
    pub async fn delete_order(&self, user: &UserId, order_id: Uuid) -> Result<bool> {
        let deleted = self.store.delete_order(user, order_id).await?;
        debug!(deleted, "order delete");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::value_objects::UserId;
    use crate::service::testing::service;

    #[tokio::test]
    async fn test_no_orders_is_empty_not_error() {
        let svc = service().await;
        assert!(svc.order_history(&UserId::new("new-user")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_is_newest_first() {
        let svc = service().await;
        let user = UserId::new("u1");
        let mut placed = vec![];
        for product in ["A", "B", "C"] {
            let item = svc.add_to_cart(&user, product).await.unwrap();
            svc.toggle_selection(&user, item.id).await.unwrap();
            placed.push(svc.checkout(&user, "DANA").await.unwrap());
        }
        placed.reverse();
        let history: Vec<_> = svc.order_history(&user).await.unwrap().iter().map(|o| o.id()).collect();
        assert_eq!(history, placed);

        assert!(svc.delete_order(&user, placed[0]).await.unwrap());
        assert_eq!(svc.order_history(&user).await.unwrap().len(), 2);
        assert!(!svc.delete_order(&user, placed[0]).await.unwrap());
    }
}
