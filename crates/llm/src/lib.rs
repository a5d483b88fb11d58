//! Response generator adapter.
//!
//! Wraps an external text-generation service behind [`ResponseGenerator`].
//! The adapter is stateless: prompt in, text out. Prompt construction lives
//! in [`prompts`]; [`GeminiClient`] is the production backend.

pub mod error;
pub mod gemini;
pub mod generator;
pub mod prompts;

pub use error::GenerationError;
pub use gemini::{GeminiClient, GeminiConfig};
pub use generator::{ReplyRequest, ResponseGenerator};
