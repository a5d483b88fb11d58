//! Shared fixtures for HTTP tests: an app over `MemoryStore` with a scripted
//! generator and zero reply delay.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use huddle_api::config::ServerConfig;
use huddle_api::router::build_app_router;
use huddle_api::state::AppState;
use huddle_core::personality::Personality;
use huddle_core::random::ThreadRandom;
use huddle_db::{MemoryStore, SessionStore};
use huddle_dialogue::DialogueEngine;
use huddle_llm::{GenerationError, ReplyRequest, ResponseGenerator};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Replies `"<display name> reply"` unless told otherwise. Feedback fails
/// until a script is set.
#[derive(Default)]
pub struct ScriptedGenerator {
    failing: Mutex<HashSet<Personality>>,
    replies: Mutex<HashMap<Personality, String>>,
    feedback: Mutex<Option<String>>,
}

impl ScriptedGenerator {
    pub fn failing_for(self, personality: Personality) -> Self {
        self.failing.lock().unwrap().insert(personality);
        self
    }

    pub fn with_reply(self, personality: Personality, text: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(personality, text.to_string());
        self
    }

    pub fn with_feedback(self, raw: &str) -> Self {
        *self.feedback.lock().unwrap() = Some(raw.to_string());
        self
    }
}

#[async_trait]
impl ResponseGenerator for ScriptedGenerator {
    async fn generate_reply(&self, request: &ReplyRequest) -> Result<String, GenerationError> {
        if self.failing.lock().unwrap().contains(&request.personality) {
            return Err(GenerationError::Api {
                status: 503,
                body: "overloaded".into(),
            });
        }
        Ok(self
            .replies
            .lock()
            .unwrap()
            .get(&request.personality)
            .cloned()
            .unwrap_or_else(|| format!("{} reply", request.personality.display_name())))
    }

    async fn generate_structured_feedback(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.feedback
            .lock()
            .unwrap()
            .clone()
            .ok_or(GenerationError::MissingApiKey)
    }
}

/// Memory storage, no reply delay and a watchdog that never fires during a
/// test.
pub fn test_config() -> ServerConfig {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("STORAGE_BACKEND", "memory"),
        ("PUBLIC_BASE_URL", "https://huddle.test"),
        ("REPLY_DELAY_MIN_MS", "0"),
        ("REPLY_DELAY_MAX_MS", "0"),
        ("WATCHDOG_INTERVAL_SECS", "3600"),
    ]);
    ServerConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
        .expect("test config is valid")
}

pub fn build_test_app(generator: ScriptedGenerator) -> Router {
    let config = test_config();
    let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::new());
    let engine = DialogueEngine::new(
        store,
        Arc::new(generator),
        Arc::new(ThreadRandom),
        config.lifecycle.clone(),
        config.scheduler.clone(),
    );
    let state = AppState {
        engine: Arc::new(engine),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn send_json(app: &Router, method: Method, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a session and return its code.
pub async fn create_session(app: &Router, simulated_count: i32) -> String {
    let response = send_json(
        app,
        Method::POST,
        "/api/v1/sessions",
        json!({
            "topic": "Climate Change Solutions",
            "scheduled_at": "2026-03-01T10:00:00Z",
            "simulated_count": simulated_count,
            "created_by": "host@example.com",
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["session_id"]
        .as_str()
        .unwrap()
        .to_string()
}

pub async fn set_status(app: &Router, session_id: &str, status: &str) -> Response<Body> {
    send_json(
        app,
        Method::PATCH,
        &format!("/api/v1/sessions/{session_id}"),
        json!({ "status": status }),
    )
    .await
}

/// Poll the message list until it holds `count` messages or a second passes.
pub async fn wait_for_messages(app: &Router, session_id: &str, count: usize) -> Vec<Value> {
    let uri = format!("/api/v1/sessions/{session_id}/messages");
    let mut messages = Vec::new();
    for _ in 0..100 {
        messages = body_json(get(app, &uri).await)
            .await
            .as_array()
            .cloned()
            .unwrap_or_default();
        if messages.len() >= count {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    messages
}
