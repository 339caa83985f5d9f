//! # Cache Pool Management
//!
//! Connection pool creation and configuration for the local SQLite
//! cache.
//!
//! ## Startup Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Session startup                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CacheConfig::new(path) ← Configure pool settings                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Cache::open(config).await ← Create pool + run migrations              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cache.carts() / cache.preferences() ← repository handles              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! WAL journal mode is enabled so cart saves (writes) never block the
//! hydration reads happening at startup.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::carts::CartCacheRepository;
use crate::error::{CacheError, CacheResult};
use crate::prefs::PreferenceRepository;

/// Embedded migrations from the `migrations/` directory.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

// =============================================================================
// Configuration
// =============================================================================

/// Cache database configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 3 (hydration read + debounced writer + preferences)
    pub max_connections: u32,

    /// Connection timeout duration.
    pub connect_timeout: Duration,

    /// Whether to run migrations on open.
    pub run_migrations: bool,
}

impl CacheConfig {
    /// Creates a configuration pointing at the given database file.
    /// The file is created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CacheConfig {
            database_path: path.into(),
            max_connections: 3,
            connect_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Creates an in-memory configuration (for testing).
    pub fn in_memory() -> Self {
        CacheConfig {
            database_path: PathBuf::from(":memory:"),
            // in-memory databases are per-connection; one connection keeps
            // every repository on the same database
            max_connections: 1,
            connect_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Cache
// =============================================================================

/// Main cache handle providing repository access.
#[derive(Debug, Clone)]
pub struct Cache {
    pool: SqlitePool,
}

impl Cache {
    /// Opens (and if needed creates) the cache database, then runs the
    /// embedded migrations.
    pub async fn open(config: CacheConfig) -> CacheResult<Self> {
        info!(path = %config.database_path.display(), "Opening local cache");

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());
        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| CacheError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true);

        debug!("Cache connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(config.connect_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| CacheError::ConnectionFailed(e.to_string()))?;

        let cache = Cache { pool };

        if config.run_migrations {
            cache.run_migrations().await?;
        }

        Ok(cache)
    }

    /// Applies pending migrations. Idempotent.
    pub async fn run_migrations(&self) -> CacheResult<()> {
        info!("Running cache migrations");
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the per-user cart snapshot repository.
    pub fn carts(&self) -> CartCacheRepository {
        CartCacheRepository::new(self.pool.clone())
    }

    /// Returns the global preference repository.
    pub fn preferences(&self) -> PreferenceRepository {
        PreferenceRepository::new(self.pool.clone())
    }

    /// Closes the connection pool (application shutdown).
    pub async fn close(&self) {
        info!("Closing local cache pool");
        self.pool.close().await;
    }

    /// Checks that the cache can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_cache() {
        let cache = Cache::open(CacheConfig::in_memory()).await.unwrap();
        assert!(cache.health_check().await);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let cache = Cache::open(CacheConfig::in_memory()).await.unwrap();
        cache.run_migrations().await.unwrap();
        cache.run_migrations().await.unwrap();
    }
}
