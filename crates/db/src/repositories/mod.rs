//! One repository per table, each a zero-sized struct of async functions
//! taking a `&PgPool`.

pub mod message_repo;
pub mod participant_repo;
pub mod session_repo;

pub use message_repo::MessageRepo;
pub use participant_repo::ParticipantRepo;
pub use session_repo::SessionRepo;
