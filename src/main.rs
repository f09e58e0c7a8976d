//! UMKM Cart - cart and checkout service for the storefront app

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use umkm_cart::config::AppConfig;
use umkm_cart::service::{CartService, StaticCatalog};
use umkm_cart::store::CartStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = AppConfig::from_env()?;

    let store = CartStore::connect(&config.database_url, config.db_max_connections).await.context("opening cart database")?;
    let catalog = match &config.catalog_path {
        Some(path) => StaticCatalog::from_json_file(path)?,
        None => {
            tracing::warn!("CATALOG_PATH not set, add-to-cart will find no products");
            StaticCatalog::default()
        }
    };
    let service = Arc::new(CartService::new(store, Arc::new(catalog)));

    let sweeper = Arc::clone(&service);
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            tick.tick().await;
            let dropped = sweeper.release_idle_sessions();
            if dropped > 0 { tracing::debug!(dropped, "idle cart sessions released"); }
        }
    });
    let app = umkm_cart::web::router(service);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("UMKM cart listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
