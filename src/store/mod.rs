//! SQLite-backed storage for cart lines and orders.
//!
//! `CartStore` is the only writer of both tables. It is constructed once by the
//! application wiring and shared by handle; the pool inside is cheap to clone.

mod cart_items;
mod orders;

use std::str::FromStr;
use std::time::Duration;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use crate::Result;

#[derive(Clone, Debug)]
pub struct CartStore {
    pool: SqlitePool,
}

impl CartStore {
    /// Opens (creating if needed) the database and applies migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = if database_url.contains(":memory:") {
            // each in-memory connection is its own database
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1)).connect_with(options).await?
        };
        let store = Self::from_pool(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub fn from_pool(pool: SqlitePool) -> Self { Self { pool } }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool { &self.pool }
}
