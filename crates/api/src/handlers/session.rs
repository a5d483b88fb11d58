//! Handlers for the `/sessions` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use huddle_core::session::{CreateSessionRequest, SessionStatus};
use huddle_db::models::session::Session;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListSessionsParams {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// POST /api/v1/sessions
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateSessionRequest>,
) -> AppResult<(StatusCode, Json<Session>)> {
    let session = state.engine.create_session(&input).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/v1/sessions?status=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListSessionsParams>,
) -> AppResult<Json<Vec<Session>>> {
    let status: SessionStatus = params
        .status
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("status query parameter is required".into()))?
        .parse()?;
    let sessions = state.engine.list_sessions(status).await?;
    Ok(Json(sessions))
}

/// GET /api/v1/sessions/{session_id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<Json<Session>> {
    let session = state.engine.get_session(&session_id).await?;
    Ok(Json(session))
}

/// PATCH /api/v1/sessions/{session_id}
///
/// Moves the session forward. Activation starts its watchdog; completion
/// stops it and snapshots the roster and transcript.
pub async fn update_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(input): Json<UpdateStatusRequest>,
) -> AppResult<Json<Session>> {
    let target: SessionStatus = input.status.parse()?;
    let session = state.engine.transition(&session_id, target).await?;
    Ok(Json(session))
}

/// DELETE /api/v1/sessions/{session_id}
pub async fn delete(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<StatusCode> {
    state.engine.delete_session(&session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
