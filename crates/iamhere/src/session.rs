//! In-memory conversation sessions keyed by user id.
//!
//! Each session keeps its history behind an async mutex. A chat turn holds that
//! lock from reading the history to appending the reply, so turns for one user
//! are serialized while different users proceed in parallel. Mood samples sit
//! behind a second lock that is only ever held for a push or a copy, so reading
//! them never waits on a model call.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::analysis::Indicator;
use crate::conversation::prompt::{GREETING, SYSTEM_PROMPT};
use crate::metrics;

/// Number of mood samples served by the mood-tracking endpoint (7 days x 24).
pub const MOOD_TRACKING_WINDOW: usize = 7 * 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: Role::Model, text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodSample {
    pub timestamp: DateTime<Utc>,
    pub sentiment: f64,
    pub indicators: Vec<Indicator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodTrend {
    Improving,
    Stable,
}

/// Conversational state for one user.
#[derive(Debug, Clone)]
pub struct SessionData {
    pub user_id: String,
    pub history: Vec<Turn>,
    pub last_activity: DateTime<Utc>,
}

impl SessionData {
    /// Fresh session holding only the system preamble and the greeting.
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            history: vec![Turn::user(SYSTEM_PROMPT), Turn::model(GREETING)],
            last_activity: Utc::now(),
        }
    }

    pub fn push_turn(&mut self, turn: Turn) {
        self.history.push(turn);
        self.last_activity = Utc::now();
    }

    /// Keep the system turn plus the newest `max_turns` turns.
    pub fn prune_history(&mut self, max_turns: usize) {
        if self.history.len() > max_turns {
            let tail_start = self.history.len() - max_turns;
            let mut pruned = Vec::with_capacity(max_turns + 1);
            pruned.push(self.history[0].clone());
            pruned.extend(self.history.drain(tail_start..));
            debug!(
                "Pruned history for {} to {} turns",
                self.user_id,
                pruned.len()
            );
            self.history = pruned;
        }
    }
}

/// Per-message mood samples, oldest first.
#[derive(Debug, Clone, Default)]
pub struct MoodLog {
    samples: Vec<MoodSample>,
}

impl MoodLog {
    pub fn record(&mut self, sample: MoodSample) {
        self.samples.push(sample);
    }

    /// `Improving` when the newest sample beats the one before it.
    pub fn trend(&self) -> MoodTrend {
        match self.samples.as_slice() {
            [.., previous, latest] if latest.sentiment > previous.sentiment => MoodTrend::Improving,
            _ => MoodTrend::Stable,
        }
    }

    pub fn recent(&self, limit: usize) -> Vec<MoodSample> {
        let start = self.samples.len().saturating_sub(limit);
        self.samples[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// One user's session: the turn-serialized history and the mood log.
#[derive(Debug)]
pub struct Session {
    conversation: Mutex<SessionData>,
    mood: Mutex<MoodLog>,
}

impl Session {
    pub fn new(user_id: &str) -> Self {
        Self {
            conversation: Mutex::new(SessionData::new(user_id)),
            mood: Mutex::new(MoodLog::default()),
        }
    }

    /// Take the turn lock. Held for the whole turn, model call included.
    pub async fn lock(&self) -> MutexGuard<'_, SessionData> {
        self.conversation.lock().await
    }

    /// Append a sample and return the trend it produces.
    pub async fn record_mood(&self, sample: MoodSample) -> MoodTrend {
        let mut mood = self.mood.lock().await;
        mood.record(sample);
        mood.trend()
    }

    pub async fn recent_mood(&self, limit: usize) -> Vec<MoodSample> {
        self.mood.lock().await.recent(limit)
    }
}

/// Process-lifetime map of user id to session.
pub struct SessionStore {
    sessions: DashMap<String, Arc<Session>>,
    max_history_turns: usize,
}

impl SessionStore {
    pub fn new(max_history_turns: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_history_turns,
        }
    }

    pub fn max_history_turns(&self) -> usize {
        self.max_history_turns
    }

    /// Get the user's session, creating it lazily on first use.
    pub fn get_or_create(&self, user_id: &str) -> Arc<Session> {
        if let Some(session) = self.sessions.get(user_id) {
            return session.clone();
        }

        self.sessions
            .entry(user_id.to_string())
            .or_insert_with(|| {
                debug!("Creating session for {}", user_id);
                metrics::inc_sessions_created();
                Arc::new(Session::new(user_id))
            })
            .clone()
    }

    /// Drop the user's session and start a new one holding only the preamble.
    ///
    /// A turn already holding the old session finishes against it; its writes
    /// are not carried into the new session.
    pub fn reset(&self, user_id: &str) -> Arc<Session> {
        let fresh = Arc::new(Session::new(user_id));
        if self
            .sessions
            .insert(user_id.to_string(), fresh.clone())
            .is_none()
        {
            metrics::inc_sessions_created();
        }
        fresh
    }

    /// Newest `limit` mood samples, or none if the user has no session.
    ///
    /// Does not take the turn lock, so it answers while a turn is in flight.
    pub async fn mood_samples(&self, user_id: &str, limit: usize) -> Vec<MoodSample> {
        let session = match self.sessions.get(user_id) {
            Some(session) => session.clone(),
            None => return Vec::new(),
        };
        session.recent_mood(limit).await
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.sessions.contains_key(user_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(sentiment: f64) -> MoodSample {
        MoodSample {
            timestamp: Utc::now(),
            sentiment,
            indicators: vec![],
        }
    }

    #[test]
    fn test_new_session_has_preamble_only() {
        let session = SessionData::new("u1");
        assert_eq!(session.history.len(), 2);
        assert_eq!(session.history[0].role, Role::User);
        assert_eq!(session.history[0].text, SYSTEM_PROMPT);
        assert_eq!(session.history[1].role, Role::Model);
    }

    #[test]
    fn test_prune_keeps_system_turn_and_newest() {
        let mut session = SessionData::new("u1");
        for i in 0..40 {
            session.push_turn(Turn::user(format!("m{}", i)));
        }
        session.prune_history(30);
        assert_eq!(session.history.len(), 31);
        assert_eq!(session.history[0].text, SYSTEM_PROMPT);
        assert_eq!(session.history[1].text, "m10");
        assert_eq!(session.history[30].text, "m39");
    }

    #[test]
    fn test_prune_is_noop_when_short() {
        let mut session = SessionData::new("u1");
        session.push_turn(Turn::user("hi"));
        session.prune_history(30);
        assert_eq!(session.history.len(), 3);
    }

    #[test]
    fn test_mood_trend_two_point_comparison() {
        let mut mood = MoodLog::default();
        assert_eq!(mood.trend(), MoodTrend::Stable);
        mood.record(sample(-0.5));
        assert_eq!(mood.trend(), MoodTrend::Stable);
        mood.record(sample(-0.2));
        assert_eq!(mood.trend(), MoodTrend::Improving);
        mood.record(sample(-0.2));
        assert_eq!(mood.trend(), MoodTrend::Stable);
        mood.record(sample(-0.6));
        assert_eq!(mood.trend(), MoodTrend::Stable);
    }

    #[test]
    fn test_recent_mood_window() {
        let mut mood = MoodLog::default();
        for i in 0..10 {
            mood.record(sample(i as f64 / 10.0));
        }
        let recent = mood.recent(3);
        assert_eq!(recent.len(), 3);
        assert!((recent[0].sentiment - 0.7).abs() < 1e-9);
        assert_eq!(mood.recent(100).len(), 10);
        assert_eq!(mood.len(), 10);
    }

    #[tokio::test]
    async fn test_get_or_create_returns_same_session() {
        let store = SessionStore::new(30);
        let a = store.get_or_create("u1");
        let b = store.get_or_create("u1");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_reset_clears_mood_tracking() {
        let store = SessionStore::new(30);
        {
            let session = store.get_or_create("u1");
            session.lock().await.push_turn(Turn::user("buồn"));
            session.record_mood(sample(-0.4)).await;
        }
        assert_eq!(store.mood_samples("u1", MOOD_TRACKING_WINDOW).await.len(), 1);

        store.reset("u1");
        assert!(store.mood_samples("u1", MOOD_TRACKING_WINDOW).await.is_empty());

        let session = store.get_or_create("u1");
        assert_eq!(session.lock().await.history.len(), 2);
    }

    #[tokio::test]
    async fn test_reset_creates_session_for_unknown_user() {
        let store = SessionStore::new(30);
        assert!(!store.contains("ghost"));
        store.reset("ghost");
        assert!(store.contains("ghost"));
    }

    #[tokio::test]
    async fn test_mood_samples_for_unknown_user_is_empty() {
        let store = SessionStore::new(30);
        assert!(store.mood_samples("nobody", 10).await.is_empty());
        assert!(!store.contains("nobody"));
    }

    #[tokio::test]
    async fn test_concurrent_turns_for_one_user_are_serialized() {
        let store = Arc::new(SessionStore::new(1000));
        let mut handles = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let session = store.get_or_create("shared");
                let mut guard = session.lock().await;
                guard.push_turn(Turn::user(format!("q{}", i)));
                tokio::task::yield_now().await;
                guard.push_turn(Turn::model(format!("a{}", i)));
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let session = store.get_or_create("shared");
        let guard = session.lock().await;
        assert_eq!(guard.history.len(), 2 + 100);
        // every question is immediately followed by its own answer
        for pair in guard.history[2..].chunks(2) {
            assert_eq!(pair[0].text[1..], pair[1].text[1..]);
        }
    }

    #[tokio::test]
    async fn test_mood_readable_while_turn_lock_held() {
        let store = SessionStore::new(30);
        let session = store.get_or_create("u1");
        session.record_mood(sample(0.1)).await;

        let _turn = session.lock().await;
        let read = tokio::time::timeout(
            std::time::Duration::from_millis(500),
            store.mood_samples("u1", MOOD_TRACKING_WINDOW),
        )
        .await
        .expect("mood read waited on the turn lock");
        assert_eq!(read.len(), 1);
        assert_eq!(session.record_mood(sample(0.4)).await, MoodTrend::Improving);
    }
}
