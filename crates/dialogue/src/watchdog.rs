//! Per-session idle watchdog loops.
//!
//! Each active session gets one background loop that calls
//! [`TurnScheduler::watchdog_tick`] on a fixed interval. Loops stop when
//! the session completes, is deleted, or the registry shuts down.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use huddle_core::error::CoreError;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::scheduler::TurnScheduler;

/// One registered loop. `generation` tells a restarted loop apart from the
/// one it replaced.
struct Entry {
    generation: u64,
    cancel: CancellationToken,
}

type RunningMap = Arc<Mutex<HashMap<String, Entry>>>;

fn lock(running: &RunningMap) -> MutexGuard<'_, HashMap<String, Entry>> {
    match running.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Tracks the running watchdog loops.
pub struct WatchdogRegistry {
    scheduler: TurnScheduler,
    running: RunningMap,
    generations: AtomicU64,
    shutdown: CancellationToken,
    tracker: TaskTracker,
}

impl WatchdogRegistry {
    pub fn new(scheduler: TurnScheduler) -> Self {
        Self {
            scheduler,
            running: Arc::new(Mutex::new(HashMap::new())),
            generations: AtomicU64::new(0),
            shutdown: CancellationToken::new(),
            tracker: TaskTracker::new(),
        }
    }

    fn running(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        lock(&self.running)
    }

    /// Start the loop for `session_id`. Does nothing if one is running, the
    /// registry is shutting down, or the configured interval is zero.
    pub fn start(&self, session_id: &str) {
        if self.shutdown.is_cancelled() {
            return;
        }
        if self.scheduler.config().watchdog_interval.is_zero() {
            tracing::error!(
                session_id = %session_id,
                "Watchdog interval is zero, not starting watchdog",
            );
            return;
        }
        let mut running = self.running();
        if running.contains_key(session_id) {
            return;
        }
        let cancel = self.shutdown.child_token();
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        running.insert(
            session_id.to_string(),
            Entry {
                generation,
                cancel: cancel.clone(),
            },
        );
        drop(running);

        let scheduler = self.scheduler.clone();
        let registered = Arc::clone(&self.running);
        let session_id = session_id.to_string();
        self.tracker.spawn(async move {
            run(scheduler, &session_id, cancel).await;
            let mut running = lock(&registered);
            if running
                .get(&session_id)
                .is_some_and(|entry| entry.generation == generation)
            {
                running.remove(&session_id);
            }
        });
    }

    /// Stop the loop for `session_id`, if any.
    pub fn stop(&self, session_id: &str) {
        if let Some(entry) = self.running().remove(session_id) {
            entry.cancel.cancel();
        }
    }

    pub fn is_running(&self, session_id: &str) -> bool {
        self.running()
            .get(session_id)
            .is_some_and(|entry| !entry.cancel.is_cancelled())
    }

    pub fn running_count(&self) -> usize {
        self.running()
            .values()
            .filter(|entry| !entry.cancel.is_cancelled())
            .count()
    }

    /// Cancel every loop and wait up to `timeout` for them to exit.
    pub async fn shutdown(&self, timeout: Duration) {
        self.shutdown.cancel();
        self.running().clear();
        self.tracker.close();
        if tokio::time::timeout(timeout, self.tracker.wait()).await.is_err() {
            tracing::warn!("Watchdog loops did not stop before the shutdown timeout");
        }
    }
}

/// The loop body. The first check happens one full interval after start.
/// `interval` must be non-zero.
async fn run(scheduler: TurnScheduler, session_id: &str, cancel: CancellationToken) {
    let interval = scheduler.config().watchdog_interval;
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    tracing::info!(
        session_id = %session_id,
        interval_secs = interval.as_secs(),
        "Watchdog started",
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                match scheduler.watchdog_tick(session_id).await {
                    Ok(_round) => {}
                    Err(CoreError::NotFound { .. }) => {
                        tracing::info!(session_id = %session_id, "Session gone, watchdog exiting");
                        break;
                    }
                    Err(e) => {
                        tracing::error!(session_id = %session_id, error = %e, "Watchdog tick failed");
                    }
                }
            }
        }
    }

    tracing::info!(session_id = %session_id, "Watchdog stopped");
}
