//! UMKM Cart
//!
//! Cart and checkout engine for a storefront connecting small local vendors
//! (UMKM) with buyers. Buyers add products to a per-user cart, pick which lines
//! to buy, and check out with a manually confirmed payment method.
//!
//! ## Features
//! - Per-user cart with selectable lines, persisted in SQLite
//! - Live cart snapshots with derived totals
//! - Atomic checkout that clears only the purchased lines
//! - Order history, newest first

pub mod config;
pub mod domain;
pub mod service;
pub mod store;
pub mod web;

use thiserror::Error;

pub use domain::aggregates::{Cart, CartItem, CartSummary, Order, OrderLineItem, OrderStatus, ProductRef};
pub use domain::value_objects::{Money, PaymentMethod, Quantity, UserId};
pub use service::{CartService, Catalog, Clock, OrderIdGenerator};
pub use store::CartStore;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum CartError {
    #[error("Nothing selected for checkout")]
    NothingSelected,

    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    #[error("A checkout is already in progress for this user")]
    CheckoutInProgress,

    #[error("Order {0} already exists")]
    DuplicateOrder(uuid::Uuid),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Corrupt row: {0}")]
    CorruptRow(String),
}

impl From<domain::aggregates::OrderError> for CartError {
    fn from(err: domain::aggregates::OrderError) -> Self {
        match err {
            domain::aggregates::OrderError::NothingSelected => CartError::NothingSelected,
        }
    }
}

impl From<domain::value_objects::PaymentMethodError> for CartError {
    fn from(err: domain::value_objects::PaymentMethodError) -> Self {
        CartError::UnknownPaymentMethod(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CartError>;
