//! Row types for the support database
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::Indicator;
use crate::recommender::DepressionLevel;

/// One chat turn to persist. Rows are never updated after insert.
#[derive(Debug, Clone)]
pub struct NewChatRecord<'a> {
    pub user_id: &'a str,
    pub message: &'a str,
    pub response: &'a str,
    pub sentiment_score: f64,
    pub depression_indicators: &'a [Indicator],
    pub timestamp: DateTime<Utc>,
}

/// Latest assessment for a user; one row per user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTrackingRecord {
    pub user_id: String,
    pub mood_score: f64,
    pub depression_level: DepressionLevel,
    pub recommended_actions: Vec<String>,
    pub last_check: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseStats {
    pub total_chats: i64,
    pub tracked_users: i64,
    pub database_size_bytes: i64,
}

/// Fixed-width RFC 3339 so stored timestamps compare correctly as text.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(s: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .map_err(|e| anyhow::anyhow!("Failed to parse timestamp {}: {}", s, e))?
        .with_timezone(&Utc))
}
