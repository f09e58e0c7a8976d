//! Collaborators the cart core consumes but does not implement.

use std::collections::HashMap;
use std::path::Path;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::domain::aggregates::ProductRef;
use crate::{CartError, Result};

/// Read-through product lookup, consulted only when a product is added.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn product(&self, product_id: &str) -> Result<Option<ProductRef>>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub trait OrderIdGenerator: Send + Sync {
    fn next_id(&self) -> Uuid;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// Time-ordered v7 ids.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidV7Ids;

impl OrderIdGenerator for UuidV7Ids {
    fn next_id(&self) -> Uuid { Uuid::now_v7() }
}

/// Fixed product list, e.g. a catalog export loaded at startup.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    products: HashMap<String, ProductRef>,
}

impl StaticCatalog {
    pub fn new(products: impl IntoIterator<Item = ProductRef>) -> Self {
        Self { products: products.into_iter().map(|p| (p.product_id.clone(), p)).collect() }
    }

    /// Loads a JSON array of products.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CartError::Catalog(format!("reading {}: {e}", path.display())))?;
        let products: Vec<ProductRef> = serde_json::from_str(&raw)?;
        tracing::info!(count = products.len(), path = %path.display(), "catalog loaded");
        Ok(Self::new(products))
    }
}

#[async_trait]
impl Catalog for StaticCatalog {
    async fn product(&self, product_id: &str) -> Result<Option<ProductRef>> {
        Ok(self.products.get(product_id).cloned())
    }
}
