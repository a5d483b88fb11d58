//! Domain types and pure rules for scheduled group-discussion sessions.
//!
//! This crate has zero internal deps so it can be shared by the persistence
//! layer, the dialogue engine, the text-generation adapter and the HTTP API.

pub mod error;
pub mod feedback;
pub mod message;
pub mod personality;
pub mod random;
pub mod roster;
pub mod session;
pub mod transcript;
pub mod types;
pub mod watchdog;
