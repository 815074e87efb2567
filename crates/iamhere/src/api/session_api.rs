//! Session endpoints: mood tracking and reset
use axum::{
    extract::{Path, State},
    body::Bytes,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::chat_api::default_user_id;
use crate::conversation::prompt::RESET_MESSAGE;
use crate::session::{MoodSample, MOOD_TRACKING_WINDOW};
use crate::shared_state::UnifiedAppState;

#[derive(Debug, Serialize)]
pub struct MoodTrackingResponse {
    pub mood_tracking: Vec<MoodSample>,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub message: String,
}

/// Newest mood samples for the user; empty when no session exists.
pub async fn get_mood_tracking(
    State(state): State<UnifiedAppState>,
    Path(user_id): Path<String>,
) -> Json<MoodTrackingResponse> {
    let mood_tracking = state
        .shared_state
        .sessions
        .mood_samples(&user_id, MOOD_TRACKING_WINDOW)
        .await;
    Json(MoodTrackingResponse { mood_tracking })
}

/// Replace the user's session with a fresh one. Any body that is not a JSON
/// object with a string `user_id` resets the default user.
pub async fn reset_chat(State(state): State<UnifiedAppState>, body: Bytes) -> Json<ResetResponse> {
    let user_id = serde_json::from_slice::<ResetRequest>(&body)
        .map(|req| req.user_id)
        .unwrap_or_else(|_| default_user_id());

    state.shared_state.sessions.reset(&user_id);
    info!("Reset chat for user {}", user_id);

    Json(ResetResponse {
        message: RESET_MESSAGE.to_string(),
    })
}
