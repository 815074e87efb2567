//! Per-user tracking rows, replaced wholesale on each turn
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use std::sync::Arc;
use tracing::debug;

use crate::memory_db::schema::*;
use crate::recommender::DepressionLevel;

pub struct TrackingStore {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl TrackingStore {
    pub fn new(pool: Arc<Pool<SqliteConnectionManager>>) -> Self {
        Self { pool }
    }

    fn get_conn(&self) -> anyhow::Result<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| anyhow::anyhow!("Failed to get connection from pool: {}", e))
    }

    /// Insert or fully replace the user's row.
    pub fn upsert(&self, record: &UserTrackingRecord) -> anyhow::Result<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO user_tracking
             (user_id, mood_score, depression_level, recommended_actions, last_check)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &record.user_id,
                record.mood_score,
                record.depression_level.as_str(),
                serde_json::to_string(&record.recommended_actions)?,
                format_timestamp(&record.last_check),
            ],
        )?;
        debug!(
            "Tracking for {} set to {}",
            record.user_id,
            record.depression_level.as_str()
        );
        Ok(())
    }

    pub fn get(&self, user_id: &str) -> anyhow::Result<Option<UserTrackingRecord>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                "SELECT user_id, mood_score, depression_level, recommended_actions, last_check
                 FROM user_tracking WHERE user_id = ?1",
                [user_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, f64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((user_id, mood_score, level, actions_json, last_check)) = row else {
            return Ok(None);
        };

        let depression_level = DepressionLevel::parse(&level)
            .ok_or_else(|| anyhow::anyhow!("Unknown depression level in database: {}", level))?;

        Ok(Some(UserTrackingRecord {
            user_id,
            mood_score,
            depression_level,
            recommended_actions: serde_json::from_str(&actions_json)?,
            last_check: parse_timestamp(&last_check)?,
        }))
    }
}
