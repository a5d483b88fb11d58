//! Repository for the `messages` table.
//!
//! Messages are append-only: there is no update or single-row delete.

use huddle_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::message::{Message, NewMessage};

const COLUMNS: &str =
    "id, session_id, speaker, message, channel, is_simulated, personality, created_at";

/// Provides append and read operations for messages.
pub struct MessageRepo;

impl MessageRepo {
    /// Append a message, returning the created row.
    ///
    /// `created_at` is the later of the database clock and the session's
    /// newest message, so timestamps never go backwards within a session.
    pub async fn append(pool: &PgPool, input: &NewMessage) -> Result<Message, sqlx::Error> {
        let query = format!(
            "INSERT INTO messages
                (session_id, speaker, message, channel, is_simulated, personality, created_at)
             VALUES ($1, $2, $3, $4, $5, $6,
                GREATEST(
                    clock_timestamp(),
                    (SELECT MAX(created_at) FROM messages WHERE session_id = $1)
                ))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(&input.session_id)
            .bind(&input.speaker)
            .bind(&input.message)
            .bind(input.channel.as_str())
            .bind(input.is_simulated)
            .bind(input.personality.map(|p| p.as_str()))
            .fetch_one(pool)
            .await
    }

    /// List a session's messages, oldest first.
    pub async fn list_by_session(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM messages
             WHERE session_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }

    /// The newest `limit` messages, returned oldest first.
    pub async fn list_recent(
        pool: &PgPool,
        session_id: &str,
        limit: i64,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM (
                SELECT {COLUMNS} FROM messages
                WHERE session_id = $1
                ORDER BY created_at DESC, id DESC
                LIMIT $2
             ) recent
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(session_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Messages with `from <= created_at <= to`, oldest first.
    pub async fn list_between(
        pool: &PgPool,
        session_id: &str,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM messages
             WHERE session_id = $1 AND created_at >= $2 AND created_at <= $3
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(session_id)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }
}
