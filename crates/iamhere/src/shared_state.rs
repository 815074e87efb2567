//! State shared by every request handler.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::{
    analysis::{Lexicon, MoodAnalyzer},
    config::Config,
    conversation::ChatOrchestrator,
    error::AppError,
    memory_db::SupportDatabase,
    recommender::Recommender,
    session::SessionStore,
    worker_threads::{CompletionBackend, DatabaseWorker, LLMWorker},
};

pub struct SharedState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionStore>,
    pub database_worker: DatabaseWorker,
    pub orchestrator: ChatOrchestrator,
}

impl SharedState {
    /// Load the lexicon and catalog named by `config`, then wire the pipeline
    /// around the given database and model backend.
    pub fn new(
        config: Config,
        database: Arc<SupportDatabase>,
        backend: Arc<dyn CompletionBackend>,
    ) -> Result<Self, AppError> {
        let lexicon = Lexicon::load(config.lexicon_path.as_deref())?;
        let recommender = Recommender::load(config.catalog_path.as_deref())?;
        info!(
            "Loaded lexicon with {} negative and {} positive keywords",
            lexicon.negative_keywords().len(),
            lexicon.positive_keywords().len()
        );

        let sessions = Arc::new(SessionStore::new(config.max_history_turns));
        let database_worker = DatabaseWorker::new(database);
        let orchestrator = ChatOrchestrator::new(
            sessions.clone(),
            Arc::new(MoodAnalyzer::new(lexicon)),
            Arc::new(recommender),
            backend,
            database_worker.clone(),
        );

        Ok(Self {
            config: Arc::new(config),
            sessions,
            database_worker,
            orchestrator,
        })
    }

    /// Same as [`SharedState::new`] with the Gemini client built from `config`.
    pub fn with_gemini(config: Config, database: Arc<SupportDatabase>) -> Result<Self, AppError> {
        let worker = LLMWorker::new(
            &config.gemini_base_url,
            &config.gemini_model,
            &config.google_api_key,
            Duration::from_secs(config.generate_timeout_seconds),
        )
        .map_err(|e| AppError::Config(e.to_string()))?;
        Self::new(config, database, Arc::new(worker))
    }
}

/// Cheaply clonable handle passed to axum as router state.
#[derive(Clone)]
pub struct UnifiedAppState {
    pub shared_state: Arc<SharedState>,
}

impl UnifiedAppState {
    pub fn new(shared_state: Arc<SharedState>) -> Self {
        Self { shared_state }
    }
}
