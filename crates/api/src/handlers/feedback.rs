//! Handlers for post-session feedback and the summary report.

use axum::extract::{Path, State};
use axum::Json;
use huddle_core::feedback::FeedbackReport;
use huddle_dialogue::SessionReport;

use crate::error::AppResult;
use crate::state::AppState;

/// POST /api/v1/sessions/{session_id}/feedback
///
/// Always answers 200 for a known session. When scoring fails the body is
/// the placeholder report.
pub async fn generate(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<Json<FeedbackReport>> {
    let report = state.engine.generate_feedback(&session_id).await?;
    Ok(Json(report))
}

/// GET /api/v1/sessions/{session_id}/report
pub async fn report(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<Json<SessionReport>> {
    let report = state.engine.report(&session_id).await?;
    Ok(Json(report))
}
