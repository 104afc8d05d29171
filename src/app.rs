//! Wiring between the configuration, the SQLite store, and the core service.

use std::sync::Arc;

use anyhow::Result;
use orphan_links_core::LinkService;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// The core service backed by one SQLite store for both ports.
pub type SqliteLinkService = LinkService<SqliteStore, SqliteStore>;

/// Open the configured database and build the service over it.
pub async fn open(config: &Config) -> Result<SqliteLinkService> {
    let pool = db::connect(config).await?;
    Ok(from_pool(pool, config))
}

pub fn from_pool(pool: SqlitePool, config: &Config) -> SqliteLinkService {
    let store = Arc::new(SqliteStore::new(pool, config.site.root_url.clone()));
    LinkService::new(store.clone(), store, config.analysis.clone())
}
