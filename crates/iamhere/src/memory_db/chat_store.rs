//! Append-only chat history
use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::sync::Arc;
use tracing::debug;

use crate::memory_db::schema::*;

pub struct ChatStore {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl ChatStore {
    pub fn new(pool: Arc<Pool<SqliteConnectionManager>>) -> Self {
        Self { pool }
    }

    fn get_conn(&self) -> anyhow::Result<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| anyhow::anyhow!("Failed to get connection from pool: {}", e))
    }

    /// Insert one turn and return its row id.
    pub fn append(&self, record: &NewChatRecord<'_>) -> anyhow::Result<i64> {
        let conn = self.get_conn()?;
        let indicators_json = serde_json::to_string(record.depression_indicators)?;

        conn.execute(
            "INSERT INTO chat_history
             (user_id, message, response, sentiment_score, depression_indicators, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.user_id,
                record.message,
                record.response,
                record.sentiment_score,
                indicators_json,
                format_timestamp(&record.timestamp),
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!("Stored chat turn {} for user {}", id, record.user_id);

        Ok(id)
    }

    /// Sentiment scores newer than `since`, newest first.
    pub fn get_scores_since(&self, user_id: &str, since: DateTime<Utc>) -> anyhow::Result<Vec<f64>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT sentiment_score FROM chat_history
             WHERE user_id = ?1 AND timestamp > ?2
             ORDER BY timestamp DESC, id DESC",
        )?;
        let scores = stmt
            .query_map(params![user_id, format_timestamp(&since)], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<f64>>>()?;
        Ok(scores)
    }
}
