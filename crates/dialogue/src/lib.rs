//! Session lifecycle, turn-taking and feedback for group discussions.
//!
//! [`DialogueEngine`] is the entry point the transport layer calls. It
//! composes four parts:
//!
//! - [`SessionLifecycle`]: creation, roster assembly and status transitions.
//! - [`TurnScheduler`]: simulated replies after human messages and on stalls.
//! - [`WatchdogRegistry`]: one idle-check loop per active session.
//! - [`FeedbackAggregator`]: transcript and roster reduced to a scored report.
//!
//! All persistence goes through [`huddle_db::SessionStore`] and all text
//! generation through [`huddle_llm::ResponseGenerator`].

pub mod config;
pub mod engine;
pub mod feedback;
pub mod lifecycle;
pub mod scheduler;
pub mod watchdog;

pub use config::{LifecycleConfig, SchedulerConfig};
pub use engine::{DialogueEngine, SessionReport};
pub use feedback::FeedbackAggregator;
pub use lifecycle::SessionLifecycle;
pub use scheduler::{ReplyOutcome, ReplyRound, SkipReason, TurnScheduler};
pub use watchdog::WatchdogRegistry;
