//! Conversation module - prompts and the chat turn pipeline
pub mod orchestrator;
pub mod prompt;

pub use orchestrator::{ChatOrchestrator, ChatResponse, TurnWarning};
