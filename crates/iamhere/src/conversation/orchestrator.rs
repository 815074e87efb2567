//! One chat turn, end to end.
//!
//! The user's turn lock is held from reading the history until the reply is
//! appended, so turns for the same user never interleave. The mood sample goes
//! through the session's separate mood lock.
//! Model and storage failures degrade the turn instead of failing it; each one
//! is reported back to the caller as a [`TurnWarning`].

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::analysis::{Indicator, MoodAnalyzer, SentimentAnalysis};
use crate::conversation::prompt::{build_augmented_prompt, FALLBACK_REPLY};
use crate::memory_db::UserTrackingRecord;
use crate::metrics;
use crate::recommender::{DepressionLevel, EmergencyResources, Recommender};
use crate::session::{MoodSample, MoodTrend, SessionStore, Turn};
use crate::worker_threads::{CompletionBackend, DatabaseWorker, TurnRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnWarning {
    ExternalServiceUnavailable,
    StorageError,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub sentiment_analysis: SentimentAnalysis,
    pub depression_indicators: Vec<Indicator>,
    pub recommendations: Vec<String>,
    pub emergency_detected: bool,
    pub mood_trend: MoodTrend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_resources: Option<EmergencyResources>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<TurnWarning>,
}

#[derive(Clone)]
pub struct ChatOrchestrator {
    sessions: Arc<SessionStore>,
    analyzer: Arc<MoodAnalyzer>,
    recommender: Arc<Recommender>,
    backend: Arc<dyn CompletionBackend>,
    database: DatabaseWorker,
}

impl ChatOrchestrator {
    pub fn new(
        sessions: Arc<SessionStore>,
        analyzer: Arc<MoodAnalyzer>,
        recommender: Arc<Recommender>,
        backend: Arc<dyn CompletionBackend>,
        database: DatabaseWorker,
    ) -> Self {
        Self {
            sessions,
            analyzer,
            recommender,
            backend,
            database,
        }
    }

    pub async fn handle_turn(&self, user_id: &str, message: &str) -> ChatResponse {
        let preview: String = message.chars().take(50).collect();
        info!("Received message from user {}: {}...", user_id, preview);

        let analysis = self.analyzer.analyze(message);
        let prompt = build_augmented_prompt(message, &analysis);
        let mut warnings = Vec::new();
        let now = Utc::now();

        let session = self.sessions.get_or_create(user_id);
        let mut guard = session.lock().await;

        let reply = match self.backend.complete(&guard.history, &prompt).await {
            Ok(text) => text,
            Err(e) => {
                error!("Model backend {} failed: {}", self.backend.name(), e);
                metrics::inc_llm_fallback();
                warnings.push(TurnWarning::ExternalServiceUnavailable);
                FALLBACK_REPLY.to_string()
            }
        };

        guard.push_turn(Turn::user(message));
        guard.push_turn(Turn::model(reply.clone()));
        guard.prune_history(self.sessions.max_history_turns());
        let mood_trend = session
            .record_mood(MoodSample {
                timestamp: now,
                sentiment: analysis.sentiment.score,
                indicators: analysis.indicators.clone(),
            })
            .await;
        drop(guard);

        let recommendations = self
            .recommender
            .recommend(analysis.sentiment.score, &analysis.indicators);
        let emergency_detected = analysis.is_emergency();
        let emergency_resources = if emergency_detected {
            warn!("Emergency detected for user {}", user_id);
            metrics::inc_emergency();
            Some(self.recommender.emergency_resources().clone())
        } else {
            None
        };

        if !self
            .persist(user_id, message, &reply, &analysis.sentiment, &analysis.indicators, &recommendations)
            .await
        {
            warnings.push(TurnWarning::StorageError);
        }

        info!("Finished turn for user {}", user_id);
        ChatResponse {
            reply,
            sentiment_analysis: analysis.sentiment,
            depression_indicators: analysis.indicators,
            recommendations,
            emergency_detected,
            mood_trend,
            emergency_resources,
            warnings,
        }
    }

    /// Write the chat row and the tracking row. Returns false if either failed.
    async fn persist(
        &self,
        user_id: &str,
        message: &str,
        reply: &str,
        sentiment: &SentimentAnalysis,
        indicators: &[Indicator],
        recommendations: &[String],
    ) -> bool {
        let now = Utc::now();
        let saved = self
            .database
            .save_turn(TurnRecord {
                user_id: user_id.to_string(),
                message: message.to_string(),
                response: reply.to_string(),
                sentiment_score: sentiment.score,
                indicators: indicators.to_vec(),
                timestamp: now,
            })
            .await;

        let tracked = self
            .database
            .update_tracking(UserTrackingRecord {
                user_id: user_id.to_string(),
                mood_score: sentiment.score,
                depression_level: DepressionLevel::from_score(sentiment.score),
                recommended_actions: recommendations.to_vec(),
                last_check: now,
            })
            .await;

        // already logged by the worker
        saved.is_ok() && tracked.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Lexicon, SentimentLabel};
    use crate::error::LlmError;
    use crate::memory_db::SupportDatabase;
    use crate::session::MOOD_TRACKING_WINDOW;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replies with a fixed text and records every prompt it was given.
    struct ScriptedBackend {
        reply: Option<String>,
        calls: Mutex<Vec<(usize, String)>>,
    }

    impl ScriptedBackend {
        fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(&self, history: &[Turn], prompt: &str) -> Result<String, LlmError> {
            self.calls.lock().unwrap().push((history.len(), prompt.to_string()));
            self.reply.clone().ok_or(LlmError::EmptyResponse)
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn orchestrator(backend: Arc<ScriptedBackend>) -> (ChatOrchestrator, Arc<SessionStore>, DatabaseWorker) {
        let sessions = Arc::new(SessionStore::new(30));
        let database = DatabaseWorker::new(Arc::new(SupportDatabase::new_in_memory().unwrap()));
        let orchestrator = ChatOrchestrator::new(
            sessions.clone(),
            Arc::new(MoodAnalyzer::new(Lexicon::embedded().unwrap())),
            Arc::new(Recommender::embedded().unwrap()),
            backend,
            database.clone(),
        );
        (orchestrator, sessions, database)
    }

    #[tokio::test]
    async fn test_turn_appends_raw_message_and_reply() {
        let backend = Arc::new(ScriptedBackend::replying("Mình luôn ở đây."));
        let (orchestrator, sessions, database) = orchestrator(backend.clone());

        let response = orchestrator.handle_turn("u1", "hạnh phúc").await;
        assert_eq!(response.reply, "Mình luôn ở đây.");
        assert!(response.warnings.is_empty());
        assert_eq!(response.sentiment_analysis.analysis, SentimentLabel::Positive);
        assert!(!response.emergency_detected);
        assert!(response.emergency_resources.is_none());

        let calls = backend.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        // preamble only; the augmented prompt travels separately
        assert_eq!(calls[0].0, 2);
        assert!(calls[0].1.contains("hạnh phúc"));

        let session = sessions.get_or_create("u1");
        let guard = session.lock().await;
        assert_eq!(guard.history.len(), 4);
        assert_eq!(guard.history[2].text, "hạnh phúc");
        assert_eq!(guard.history[3].text, "Mình luôn ở đây.");
        drop(guard);

        let stats = database.dashboard("u1", 30).await.unwrap();
        assert_eq!(stats.chat_count, 1);
        assert!(stats.tracking.is_some());
    }

    #[tokio::test]
    async fn test_backend_failure_uses_fallback() {
        let (orchestrator, _, _) = orchestrator(Arc::new(ScriptedBackend::failing()));
        let response = orchestrator.handle_turn("u1", "xin chào").await;
        assert_eq!(response.reply, FALLBACK_REPLY);
        assert_eq!(response.warnings, vec![TurnWarning::ExternalServiceUnavailable]);
    }

    #[tokio::test]
    async fn test_storage_failure_degrades_turn() {
        let (orchestrator, sessions, database) =
            orchestrator(Arc::new(ScriptedBackend::replying("Mình vẫn ở đây.")));
        database
            .database()
            .execute_batch("DROP TABLE chat_history; DROP TABLE user_tracking;")
            .unwrap();

        let response = orchestrator.handle_turn("u1", "tôi buồn").await;
        assert_eq!(response.reply, "Mình vẫn ở đây.");
        assert_eq!(response.warnings, vec![TurnWarning::StorageError]);
        assert_eq!(response.sentiment_analysis.analysis, SentimentLabel::Negative);
        // the in-memory session still advances
        assert_eq!(sessions.mood_samples("u1", MOOD_TRACKING_WINDOW).await.len(), 1);
        assert_eq!(sessions.get_or_create("u1").lock().await.history.len(), 4);
    }

    #[tokio::test]
    async fn test_suicidal_message_triggers_emergency() {
        let (orchestrator, _, _) = orchestrator(Arc::new(ScriptedBackend::replying("ok")));
        let response = orchestrator.handle_turn("u1", "tôi đã nghĩ đến tự tử").await;
        assert!(response.emergency_detected);
        assert!(response
            .depression_indicators
            .contains(&Indicator::SuicidalThoughts));
        let resources = response.emergency_resources.unwrap();
        assert!(!resources.hotlines.is_empty());
    }

    #[tokio::test]
    async fn test_mood_trend_across_turns() {
        let (orchestrator, sessions, _) = orchestrator(Arc::new(ScriptedBackend::replying("ok")));
        let first = orchestrator.handle_turn("u1", "tôi buồn").await;
        assert_eq!(first.mood_trend, MoodTrend::Stable);
        let second = orchestrator.handle_turn("u1", "hạnh phúc").await;
        assert_eq!(second.mood_trend, MoodTrend::Improving);
        assert_eq!(sessions.mood_samples("u1", MOOD_TRACKING_WINDOW).await.len(), 2);
    }

    #[tokio::test]
    async fn test_history_is_pruned() {
        let (orchestrator, sessions, _) = orchestrator(Arc::new(ScriptedBackend::replying("ok")));
        for i in 0..20 {
            orchestrator.handle_turn("u1", &format!("tin nhắn {}", i)).await;
        }
        let session = sessions.get_or_create("u1");
        let guard = session.lock().await;
        assert_eq!(guard.history.len(), 31);
        assert_eq!(guard.history[30].text, "ok");
    }

    #[test]
    fn test_response_serialization() {
        let response = ChatResponse {
            reply: "r".into(),
            sentiment_analysis: SentimentAnalysis::neutral(),
            depression_indicators: vec![Indicator::EnergyLoss],
            recommendations: vec![],
            emergency_detected: false,
            mood_trend: MoodTrend::Stable,
            emergency_resources: None,
            warnings: vec![TurnWarning::StorageError],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["mood_trend"], "stable");
        assert_eq!(json["depression_indicators"][0], "energy_loss");
        assert_eq!(json["warnings"][0], "storage_error");
        assert_eq!(json["sentiment_analysis"]["analysis"], "neutral");
        assert!(json.get("emergency_resources").is_none());
    }
}
