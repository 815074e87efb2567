//! SQLite storage for chat history and per-user tracking
pub mod chat_store;
pub mod dashboard;
pub mod migration;
pub mod schema;
pub mod tracking_store;

pub use chat_store::ChatStore;
pub use dashboard::{DashboardStats, DashboardTrend};
pub use migration::MigrationManager;
pub use schema::*;
pub use tracking_store::TrackingStore;

use chrono::{DateTime, Duration, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub struct SupportDatabase {
    pub chats: ChatStore,
    pub tracking: TrackingStore,
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl SupportDatabase {
    /// Open (or create) the database file and bring the schema up to date.
    pub fn new(db_path: &Path) -> anyhow::Result<Self> {
        info!("Opening support database at: {}", db_path.display());

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(db_path).with_flags(
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        );
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| anyhow::anyhow!("Failed to create connection pool: {}", e))?;

        {
            let mut conn = pool.get()?;
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;",
            )?;
            MigrationManager::new(&mut conn).initialize_database()?;
        }

        info!("Support database initialized successfully");
        Ok(Self::from_pool(Arc::new(pool)))
    }

    /// Private in-memory database. Every pooled connection would open a
    /// separate empty database, so the pool holds exactly one.
    pub fn new_in_memory() -> anyhow::Result<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager)?;
        {
            let mut conn = pool.get()?;
            MigrationManager::new(&mut conn).initialize_database()?;
        }
        Ok(Self::from_pool(Arc::new(pool)))
    }

    fn from_pool(pool: Arc<Pool<SqliteConnectionManager>>) -> Self {
        Self {
            chats: ChatStore::new(Arc::clone(&pool)),
            tracking: TrackingStore::new(Arc::clone(&pool)),
            pool,
        }
    }

    pub fn get_stats(&self) -> anyhow::Result<DatabaseStats> {
        let conn = self.pool.get()?;
        Ok(migration::get_database_stats(&conn)?)
    }

    /// Statistics over the `window_days` days ending at `now`.
    pub fn dashboard(
        &self,
        user_id: &str,
        window_days: i64,
        now: DateTime<Utc>,
    ) -> anyhow::Result<DashboardStats> {
        let since = now - Duration::days(window_days);
        let scores = self.chats.get_scores_since(user_id, since)?;
        let tracking = self.tracking.get(user_id)?;
        Ok(DashboardStats::compute(user_id, &scores, tracking))
    }

    /// Run raw SQL against the pool, for tests that need to damage the schema.
    #[cfg(test)]
    pub(crate) fn execute_batch(&self, sql: &str) -> anyhow::Result<()> {
        self.pool.get()?.execute_batch(sql)?;
        Ok(())
    }
}
