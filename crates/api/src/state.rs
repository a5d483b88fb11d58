use std::sync::Arc;

use huddle_dialogue::DialogueEngine;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Sessions, turn-taking, watchdogs and feedback.
    pub engine: Arc<DialogueEngine>,
    pub config: Arc<ServerConfig>,
}
