use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use huddle_api::config::{ServerConfig, StorageBackend};
use huddle_api::router::build_app_router;
use huddle_api::state::AppState;
use huddle_core::random::ThreadRandom;
use huddle_db::{MemoryStore, PgStore, SessionStore};
use huddle_dialogue::DialogueEngine;
use huddle_llm::GeminiClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "huddle_api=debug,huddle_dialogue=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Storage ---
    let store: Arc<dyn SessionStore> = match &config.storage {
        StorageBackend::Postgres { database_url } => {
            let pool = huddle_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            huddle_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            huddle_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgStore::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, sessions will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    // --- Response generator ---
    let generator =
        GeminiClient::new(config.gemini.clone()).expect("Failed to build Gemini HTTP client");
    if !generator.is_configured() {
        tracing::warn!("GEMINI_API_KEY is not set, simulated replies and feedback will fail");
    }

    // --- Dialogue engine ---
    let engine = Arc::new(DialogueEngine::new(
        store,
        Arc::new(generator),
        Arc::new(ThreadRandom),
        config.lifecycle.clone(),
        config.scheduler.clone(),
    ));
    match engine.resume_watchdogs().await {
        Ok(count) => tracing::info!(count, "Watchdogs resumed"),
        Err(e) => tracing::error!(error = %e, "Failed to resume watchdogs"),
    }

    // --- App state and router ---
    let state = AppState {
        engine: Arc::clone(&engine),
        config: Arc::new(config.clone()),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, stopping watchdogs");
    engine
        .shutdown(Duration::from_secs(config.shutdown_timeout_secs))
        .await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
