use tracing::{info, instrument, warn};
use uuid::Uuid;
use crate::domain::aggregates::Order;
use crate::domain::value_objects::{PaymentMethod, UserId};
use crate::{CartError, Result};
use super::CartService;

impl CartService {
    /// Turns the selected lines into an order and removes them from the cart.
    ///
    /// The payment method is parsed before anything else. Only one checkout per
    /// user may be in flight; a concurrent attempt fails with
    /// [`CartError::CheckoutInProgress`] instead of waiting.
    #[instrument(skip(self, user), fields(user = %user))]
    pub async fn checkout(&self, user: &UserId, payment_method: &str) -> Result<Uuid> {
        let method = PaymentMethod::parse(payment_method)?;
        self.checkout_with(user, method).await.map(|order| order.id())
    }

    pub async fn checkout_with(&self, user: &UserId, method: PaymentMethod) -> Result<Order> {
        let session = self.session(user);
        let placed = match session.checkout.try_lock() {
            Ok(_in_flight) => {
                self.mutate(user, || {
                    self.store.checkout_selected(user, |selected| {
                        let order = Order::place(self.ids.next_id(), user.clone(), selected, method, self.clock.now())?;
                        Ok(order)
                    })
                })
                .await
            }
            Err(_) => {
                warn!(user = %user, "checkout rejected, another attempt is running");
                Err(CartError::CheckoutInProgress)
            }
        };
        self.release(user, session);
        let mut order = placed?;

        info!(
            order_id = %order.id(),
            total = %order.total(),
            lines = order.line_items().len(),
            payment_method = %method,
            "order placed"
        );
        for event in order.take_events() {
            self.announce(user, &event);
        }
        Ok(order)
    }
}
