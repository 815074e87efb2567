pub mod database_worker;
pub mod llm_worker;
pub use database_worker::{DatabaseWorker, TurnRecord};
pub use llm_worker::{CompletionBackend, LLMWorker};
