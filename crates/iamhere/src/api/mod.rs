//! API module - HTTP handlers for chat, sessions and statistics

pub mod admin_api;
pub mod chat_api;
pub mod dashboard_api;
pub mod session_api;

pub use admin_api::{health, home};
pub use chat_api::{chat, ChatRequest};
pub use dashboard_api::get_dashboard;
pub use session_api::{get_mood_tracking, reset_chat};
