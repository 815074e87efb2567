pub mod analysis;
pub mod api;
pub mod config;
pub mod conversation;
pub mod error;
pub mod memory_db;
pub mod metrics;
pub mod recommender;
pub mod server;
pub mod session;
pub mod shared_state;
pub mod telemetry;
pub mod worker_threads;

// Public API exports
pub use analysis::{Indicator, Lexicon, MoodAnalyzer, SentimentAnalysis, SentimentLabel};
pub use config::Config;
pub use conversation::{ChatOrchestrator, ChatResponse, TurnWarning};
pub use error::{AppError, LexiconError, LlmError};
pub use memory_db::{DashboardStats, DashboardTrend, SupportDatabase};
pub use recommender::{DepressionLevel, EmergencyResources, Recommender, Severity};
pub use server::{build_router, run_server};
pub use session::{MoodSample, MoodTrend, SessionStore};
pub use worker_threads::{CompletionBackend, LLMWorker};
