//! Cart service: the operations the presentation layer calls.
//!
//! One `CartService` is built by the application wiring around a `CartStore`
//! and its collaborators. Every mutation for a user is serialized and followed
//! by a fresh snapshot pushed to that user's subscribers.

mod checkout;
mod history;
mod ports;
mod quantity;
mod selection;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use parking_lot::Mutex;
use tokio::sync::{watch, Mutex as AsyncMutex};
use tracing::{debug, info, instrument, warn};

pub use ports::{Catalog, Clock, OrderIdGenerator, StaticCatalog, SystemClock, UuidV7Ids};

use crate::domain::aggregates::{Cart, CartItem, ProductRef};
use crate::domain::events::CartEvent;
use crate::domain::value_objects::UserId;
use crate::store::CartStore;
use crate::{CartError, Result};

/// Per-user channels and locks.
struct Session {
    cart: watch::Sender<Cart>,
    message: watch::Sender<Option<String>>,
    writes: AsyncMutex<()>,
    checkout: AsyncMutex<()>,
}

impl Session {
    fn new(user: &UserId) -> Self {
        Self {
            cart: watch::Sender::new(Cart::empty(user.clone())),
            message: watch::Sender::new(None),
            writes: AsyncMutex::new(()),
            checkout: AsyncMutex::new(()),
        }
    }
}

/// Only the map holds it (so no lock is held), nobody listens and no message waits.
fn idle(session: &Arc<Session>) -> bool {
    Arc::strong_count(session) == 1
        && session.cart.receiver_count() == 0
        && session.message.receiver_count() == 0
        && session.message.borrow().is_none()
}

pub struct CartService {
    store: CartStore,
    catalog: Arc<dyn Catalog>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn OrderIdGenerator>,
    sessions: Mutex<HashMap<UserId, Arc<Session>>>,
}

impl CartService {
    pub fn new(store: CartStore, catalog: Arc<dyn Catalog>) -> Self {
        Self::with_collaborators(store, catalog, Arc::new(SystemClock), Arc::new(UuidV7Ids))
    }

    pub fn with_collaborators(
        store: CartStore,
        catalog: Arc<dyn Catalog>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn OrderIdGenerator>,
    ) -> Self {
        Self { store, catalog, clock, ids, sessions: Mutex::new(HashMap::new()) }
    }

    pub fn store(&self) -> &CartStore { &self.store }

    fn session(&self, user: &UserId) -> Arc<Session> {
        self.sessions.lock().entry(user.clone()).or_insert_with(|| Arc::new(Session::new(user))).clone()
    }

    /// Gives back a handle from [`Self::session`] and forgets the session once idle.
    /// Handles are only cloned out under the map lock, so an idle entry cannot be
    /// in use elsewhere.
    fn release(&self, user: &UserId, session: Arc<Session>) {
        let mut sessions = self.sessions.lock();
        drop(session);
        if sessions.get(user).is_some_and(idle) {
            sessions.remove(user);
        }
    }

    /// Forgets every idle session, e.g. ones whose last subscriber went away.
    /// Returns how many were dropped.
    pub fn release_idle_sessions(&self) -> usize {
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, session| !idle(session));
        before - sessions.len()
    }

    #[cfg(test)]
    pub(crate) fn session_count(&self) -> usize { self.sessions.lock().len() }

    /// Runs `op` under the user's write lock, then publishes the new cart.
    ///
    /// Once `op` has committed its result is returned even if the refresh
    /// fails; subscribers catch up on the next successful publish.
    async fn mutate<T, F, Fut>(&self, user: &UserId, op: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let session = self.session(user);
        let out = {
            let _writes = session.writes.lock().await;
            let out = op().await;
            if out.is_ok() {
                if let Err(e) = self.publish(user, &session).await {
                    warn!(user = %user, error = %e, "cart written but snapshot refresh failed");
                }
            }
            out
        };
        self.release(user, session);
        out
    }

    async fn publish(&self, user: &UserId, session: &Session) -> Result<Cart> {
        let cart = Cart::new(user.clone(), self.store.items(user).await?);
        session.cart.send_replace(cart.clone());
        Ok(cart)
    }

    fn announce(&self, user: &UserId, event: &CartEvent) {
        self.session(user).message.send_replace(Some(event.message()));
    }

    // -------------------------------------------------------------------------
    // Observation
    // -------------------------------------------------------------------------

    /// Live cart for a user. Drop the receiver to unsubscribe.
    pub async fn subscribe(&self, user: &UserId) -> Result<watch::Receiver<Cart>> {
        let session = self.session(user);
        let rx = {
            let _writes = session.writes.lock().await;
            self.publish(user, &session).await.map(|_| session.cart.subscribe())
        };
        self.release(user, session);
        rx
    }

    /// Current cart read straight from the store.
    pub async fn cart(&self, user: &UserId) -> Result<Cart> {
        Ok(Cart::new(user.clone(), self.store.items(user).await?))
    }

    pub fn subscribe_messages(&self, user: &UserId) -> watch::Receiver<Option<String>> {
        self.session(user).message.subscribe()
    }

    /// Returns the pending action message and clears it.
    pub fn take_message(&self, user: &UserId) -> Option<String> {
        let session = self.sessions.lock().get(user).cloned()?;
        let message = session.message.send_replace(None);
        self.release(user, session);
        message
    }

    // -------------------------------------------------------------------------
    // Cart lines
    // -------------------------------------------------------------------------

    /// Looks the product up in the catalog and adds one unit of it.
    #[instrument(skip(self, user), fields(user = %user))]
    pub async fn add_to_cart(&self, user: &UserId, product_id: &str) -> Result<CartItem> {
        let product = self
            .catalog
            .product(product_id)
            .await?
            .ok_or_else(|| CartError::ProductNotFound(product_id.to_string()))?;
        self.add_product(user, &product).await
    }

    /// Adds one unit of an already resolved product snapshot.
    #[instrument(skip(self, user, product), fields(user = %user, product = %product.product_id))]
    pub async fn add_product(&self, user: &UserId, product: &ProductRef) -> Result<CartItem> {
        let item = self.mutate(user, || self.store.add_or_increment(user, product)).await?;
        let event = CartEvent::ItemAdded {
            product_id: item.product.product_id.clone(),
            product_name: item.product.name.clone(),
            quantity: item.quantity.value(),
        };
        info!(item_id = item.id, quantity = item.quantity.value(), "added to cart");
        self.announce(user, &event);
        Ok(item)
    }

    #[instrument(skip(self, user), fields(user = %user))]
    pub async fn remove_item(&self, user: &UserId, item_id: i64) -> Result<()> {
        self.mutate(user, || self.store.remove(user, item_id)).await?;
        debug!("removed");
        Ok(())
    }

    /// Empties the whole cart; not part of checkout.
    #[instrument(skip(self, user), fields(user = %user))]
    pub async fn clear_cart(&self, user: &UserId) -> Result<u64> {
        let removed = self.mutate(user, || self.store.clear_all(user)).await?;
        debug!(removed, "cart cleared");
        Ok(removed)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::domain::value_objects::Money;
    use chrono::{DateTime, Duration, Utc};
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Advances one second per reading.
    pub struct StepClock(pub AtomicI64);

    impl Clock for StepClock {
        fn now(&self) -> DateTime<Utc> {
            let n = self.0.fetch_add(1, Ordering::SeqCst);
            DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap_or_default() + Duration::seconds(n)
        }
    }

    pub fn product(id: &str, price: i64) -> ProductRef {
        ProductRef {
            product_id: id.into(),
            name: format!("Produk {id}"),
            price: Money::from_rupiah(price),
            image: String::new(),
            vendor_id: "V1".into(),
            vendor_name: "Warung Bu Sri".into(),
        }
    }

    pub async fn service() -> CartService {
        let store = CartStore::connect("sqlite::memory:", 1).await.unwrap();
        let catalog = StaticCatalog::new([product("A", 10000), product("B", 5000), product("C", 2500)]);
        CartService::with_collaborators(store, Arc::new(catalog), Arc::new(StepClock(AtomicI64::new(0))), Arc::new(UuidV7Ids))
    }
}
