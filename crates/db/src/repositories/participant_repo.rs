//! Repository for the `participants` table.

use huddle_core::types::DbId;
use sqlx::PgPool;

use crate::models::participant::{NewParticipant, Participant};

const COLUMNS: &str = "id, session_id, name, kind, personality, joined_at, is_active";

/// Provides CRUD operations for participants.
pub struct ParticipantRepo;

impl ParticipantRepo {
    /// Insert a participant, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewParticipant) -> Result<Participant, sqlx::Error> {
        let query = format!(
            "INSERT INTO participants (session_id, name, kind, personality)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Participant>(&query)
            .bind(&input.session_id)
            .bind(&input.name)
            .bind(input.kind.as_str())
            .bind(input.personality.map(|p| p.as_str()))
            .fetch_one(pool)
            .await
    }

    /// List a session's participants in join order.
    pub async fn list_by_session(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<Vec<Participant>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM participants
             WHERE session_id = $1
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, Participant>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }

    /// Set the active flag. Returns `None` if the participant is not part of
    /// the session.
    pub async fn set_active(
        pool: &PgPool,
        session_id: &str,
        id: DbId,
        active: bool,
    ) -> Result<Option<Participant>, sqlx::Error> {
        let query = format!(
            "UPDATE participants SET is_active = $3
             WHERE id = $1 AND session_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Participant>(&query)
            .bind(id)
            .bind(session_id)
            .bind(active)
            .fetch_optional(pool)
            .await
    }
}
