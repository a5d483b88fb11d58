//! Handlers for messages, simulated replies and the transcript.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use huddle_core::message::{AppendMessageRequest, TriggerReplyRequest};
use huddle_core::transcript::TranscriptEntry;
use huddle_core::types::Timestamp;
use huddle_db::models::message::Message;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::state::AppState;

/// Inclusive time bounds, RFC 3339.
#[derive(Debug, Deserialize)]
pub struct MessageRangeParams {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
pub struct ReplyResponse {
    pub response: String,
}

/// GET /api/v1/sessions/{session_id}/messages?from=&to=
pub async fn list(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(range): Query<MessageRangeParams>,
) -> AppResult<Json<Vec<Message>>> {
    let messages = state
        .engine
        .list_messages(&session_id, range.from, range.to)
        .await?;
    Ok(Json(messages))
}

/// POST /api/v1/sessions/{session_id}/messages
///
/// Returns once the human message is stored. Simulated replies arrive
/// later through the message list.
pub async fn append(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(input): Json<AppendMessageRequest>,
) -> AppResult<(StatusCode, Json<Message>)> {
    // Dropping the round detaches its turns; they persist on their own.
    let (message, _round) = state.engine.post_message(&session_id, &input).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// POST /api/v1/sessions/{session_id}/replies
pub async fn trigger_reply(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(input): Json<TriggerReplyRequest>,
) -> AppResult<Json<ReplyResponse>> {
    let message = state.engine.trigger_reply(&session_id, &input).await?;
    Ok(Json(ReplyResponse {
        response: message.message,
    }))
}

/// GET /api/v1/sessions/{session_id}/transcript
pub async fn transcript(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<Json<Vec<TranscriptEntry>>> {
    let entries = state.engine.transcript(&session_id).await?;
    Ok(Json(entries))
}
