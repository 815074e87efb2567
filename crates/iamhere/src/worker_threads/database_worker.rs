//! Database worker
//!
//! Runs SQLite calls on the blocking pool so handlers never stall the runtime.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error};

use crate::analysis::Indicator;
use crate::error::AppError;
use crate::memory_db::{DashboardStats, NewChatRecord, SupportDatabase, UserTrackingRecord};

/// One completed chat turn, owned so it can cross into the blocking pool.
#[derive(Debug, Clone)]
pub struct TurnRecord {
    pub user_id: String,
    pub message: String,
    pub response: String,
    pub sentiment_score: f64,
    pub indicators: Vec<Indicator>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone)]
pub struct DatabaseWorker {
    database: Arc<SupportDatabase>,
}

impl DatabaseWorker {
    pub fn new(database: Arc<SupportDatabase>) -> Self {
        Self { database }
    }

    pub fn database(&self) -> &Arc<SupportDatabase> {
        &self.database
    }

    async fn run<T, F>(&self, operation: &'static str, f: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&SupportDatabase) -> anyhow::Result<T> + Send + 'static,
    {
        let database = Arc::clone(&self.database);
        tokio::task::spawn_blocking(move || f(&database))
            .await
            .map_err(|e| AppError::internal("Database task failed", e))?
            .map_err(|e| {
                error!("Database worker failed to {}: {:#}", operation, e);
                AppError::Storage(format!("{}: {}", operation, e))
            })
    }

    /// Append one chat turn to the history table.
    pub async fn save_turn(&self, turn: TurnRecord) -> Result<i64, AppError> {
        debug!("Database worker storing turn for user: {}", turn.user_id);
        self.run("save chat turn", move |db| {
            db.chats.append(&NewChatRecord {
                user_id: &turn.user_id,
                message: &turn.message,
                response: &turn.response,
                sentiment_score: turn.sentiment_score,
                depression_indicators: &turn.indicators,
                timestamp: turn.timestamp,
            })
        })
        .await
    }

    pub async fn update_tracking(&self, record: UserTrackingRecord) -> Result<(), AppError> {
        debug!("Database worker updating tracking for user: {}", record.user_id);
        self.run("update user tracking", move |db| db.tracking.upsert(&record))
            .await
    }

    pub async fn dashboard(&self, user_id: &str, window_days: i64) -> Result<DashboardStats, AppError> {
        let user_id = user_id.to_string();
        self.run("build dashboard", move |db| {
            db.dashboard(&user_id, window_days, Utc::now())
        })
        .await
    }
}
