//! Repository for the `sessions` table.

use huddle_core::feedback::FeedbackReport;
use huddle_core::session::SessionStatus;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::session::{NewSession, Session, StatusUpdate};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, session_id, topic, scheduled_at, simulated_count, human_count, \
    join_link, status, created_by, participants, transcript, feedback, \
    started_at, completed_at, duration_secs, created_at";

/// Provides CRUD operations for sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session in `scheduled` status, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions
                (session_id, topic, scheduled_at, simulated_count, human_count,
                 join_link, status, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, 'scheduled', $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(&input.session_id)
            .bind(&input.topic)
            .bind(input.scheduled_at)
            .bind(input.simulated_count)
            .bind(input.human_count)
            .bind(&input.join_link)
            .bind(&input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a session by its shareable code.
    pub async fn find_by_session_id(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE session_id = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(session_id)
            .fetch_optional(pool)
            .await
    }

    /// List sessions in a status, ordered by creation time ascending.
    pub async fn list_by_status(
        pool: &PgPool,
        status: SessionStatus,
    ) -> Result<Vec<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions
             WHERE status = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(status.as_str())
            .fetch_all(pool)
            .await
    }

    /// Compare-and-set the status. Only non-`None` timing fields are applied.
    ///
    /// Returns `None` if no row with `session_id` currently has
    /// `update.expected` as its status.
    pub async fn update_status(
        pool: &PgPool,
        session_id: &str,
        update: &StatusUpdate,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "UPDATE sessions SET
                status = $3,
                started_at = COALESCE($4, started_at),
                completed_at = COALESCE($5, completed_at),
                duration_secs = COALESCE($6, duration_secs)
             WHERE session_id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(session_id)
            .bind(update.expected.as_str())
            .bind(update.status.as_str())
            .bind(update.started_at)
            .bind(update.completed_at)
            .bind(update.duration_secs)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the roster and transcript snapshots.
    pub async fn save_snapshots(
        pool: &PgPool,
        session_id: &str,
        participants: &serde_json::Value,
        transcript: &serde_json::Value,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "UPDATE sessions SET participants = $2, transcript = $3
             WHERE session_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(session_id)
            .bind(participants)
            .bind(transcript)
            .fetch_optional(pool)
            .await
    }

    /// Replace the stored feedback report.
    pub async fn save_feedback(
        pool: &PgPool,
        session_id: &str,
        report: &FeedbackReport,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "UPDATE sessions SET feedback = $2
             WHERE session_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(session_id)
            .bind(Json(report))
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a session. Participants and messages go with it
    /// via `ON DELETE CASCADE`. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, session_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
