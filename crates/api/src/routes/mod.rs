pub mod health;
pub mod session;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /sessions                                        list, create
/// /sessions/{session_id}                           get, change status, delete
/// /sessions/{session_id}/participants              list, add
/// /sessions/{session_id}/participants/{id}         toggle active
/// /sessions/{session_id}/messages                  list (time range), append
/// /sessions/{session_id}/replies                   single simulated reply
/// /sessions/{session_id}/feedback                  generate feedback
/// /sessions/{session_id}/transcript                formatted transcript
/// /sessions/{session_id}/report                    summary bundle
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/sessions", session::router())
}
