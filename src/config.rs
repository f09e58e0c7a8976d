//! Runtime configuration read from the environment (and `.env` when present).

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub port: u16,
    /// JSON product export used to resolve add-to-cart requests.
    pub catalog_path: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub reason: String,
}

impl AppConfig {
    pub const DEFAULT_DATABASE_URL: &'static str = "sqlite://umkm_cart.db?mode=rwc";

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = get("DATABASE_URL").unwrap_or_else(|| Self::DEFAULT_DATABASE_URL.to_string());
        let db_max_connections = parse(&get, "DB_MAX_CONNECTIONS", 5)?;
        let port = parse(&get, "PORT", 8083)?;
        let catalog_path = get("CATALOG_PATH").filter(|p| !p.trim().is_empty()).map(PathBuf::from);

        tracing::debug!(%database_url, db_max_connections, port, "configuration loaded");
        Ok(Self { database_url, db_max_connections, port, catalog_path })
    }
}

fn parse<T>(get: &impl Fn(&str) -> Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError { var, reason: format!("'{raw}': {e}") }),
    }
}
