//! Handlers for `/sessions/{session_id}/participants`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use huddle_core::roster::AddParticipantRequest;
use huddle_core::types::DbId;
use huddle_db::models::participant::Participant;
use serde::Deserialize;

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// GET /api/v1/sessions/{session_id}/participants
pub async fn list(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<Json<Vec<Participant>>> {
    let participants = state.engine.list_participants(&session_id).await?;
    Ok(Json(participants))
}

/// POST /api/v1/sessions/{session_id}/participants
pub async fn add(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(input): Json<AddParticipantRequest>,
) -> AppResult<(StatusCode, Json<Participant>)> {
    let participant = state.engine.add_participant(&session_id, &input).await?;
    Ok((StatusCode::CREATED, Json(participant)))
}

/// PATCH /api/v1/sessions/{session_id}/participants/{id}
pub async fn set_active(
    State(state): State<AppState>,
    Path((session_id, id)): Path<(String, DbId)>,
    Json(input): Json<SetActiveRequest>,
) -> AppResult<Json<Participant>> {
    let participant = state
        .engine
        .set_participant_active(&session_id, id, input.is_active)
        .await?;
    Ok(Json(participant))
}
