use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{error, info};

use crate::error::AppError;
use crate::memory_db::DashboardStats;
use crate::shared_state::UnifiedAppState;

/// Per-user statistics over the configured window.
pub async fn get_dashboard(
    State(state): State<UnifiedAppState>,
    Path(user_id): Path<String>,
) -> Result<Json<DashboardStats>, AppError> {
    let window_days = state.shared_state.config.dashboard_window_days;
    let stats = state
        .shared_state
        .database_worker
        .dashboard(&user_id, window_days)
        .await
        .map_err(|e| {
            error!("Failed to build dashboard for {}: {}", user_id, e);
            AppError::internal("Lỗi tạo dashboard", e)
        })?;

    info!(
        "Dashboard for {}: {} chats, trend {}",
        user_id, stats.chat_count, stats.trend
    );
    Ok(Json(stats))
}
