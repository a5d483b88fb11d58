//! Route definitions for the `/sessions` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{feedback, message, participant, session};
use crate::state::AppState;

/// Routes mounted at `/sessions`.
///
/// ```text
/// GET    /                                   -> list (?status=)
/// POST   /                                   -> create
/// GET    /{session_id}                       -> get_by_id
/// PATCH  /{session_id}                       -> update_status
/// DELETE /{session_id}                       -> delete
///
/// GET    /{session_id}/participants          -> list
/// POST   /{session_id}/participants          -> add
/// PATCH  /{session_id}/participants/{id}     -> set_active
///
/// GET    /{session_id}/messages              -> list (?from=&to=)
/// POST   /{session_id}/messages              -> append
/// POST   /{session_id}/replies               -> trigger_reply
/// GET    /{session_id}/transcript            -> transcript
///
/// POST   /{session_id}/feedback              -> generate
/// GET    /{session_id}/report                -> report
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(session::list).post(session::create))
        .route(
            "/{session_id}",
            get(session::get_by_id)
                .patch(session::update_status)
                .delete(session::delete),
        )
        .route(
            "/{session_id}/participants",
            get(participant::list).post(participant::add),
        )
        .route(
            "/{session_id}/participants/{id}",
            patch(participant::set_active),
        )
        .route(
            "/{session_id}/messages",
            get(message::list).post(message::append),
        )
        .route("/{session_id}/replies", post(message::trigger_reply))
        .route("/{session_id}/transcript", get(message::transcript))
        .route("/{session_id}/feedback", post(feedback::generate))
        .route("/{session_id}/report", get(feedback::report))
}
