//! System API Handlers

use axum::{Json, extract::State};
use shared::AppResult;
use shared::models::{DailyResetRequest, DailyResetSummary};

use crate::auth::Operator;
use crate::core::ServerState;
use crate::lifecycle::reset;

/// POST /api/system/daily-reset - end-of-day sweep (admin only)
pub async fn daily_reset(
    State(state): State<ServerState>,
    op: Operator,
    Json(payload): Json<DailyResetRequest>,
) -> AppResult<Json<DailyResetSummary>> {
    let summary = reset::daily_reset(&state.db.pool, &op, payload.force).await?;

    // Everything changed; subscribers should re-query from scratch
    state.broadcast_change::<()>("venue", "reset", op.venue_id, None);
    Ok(Json(summary))
}
