use huddle_core::error::CoreError;

/// Errors raised by a [`SessionStore`](crate::SessionStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique key is already taken.
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    /// The owning session does not exist.
    #[error("Session {0} does not exist")]
    MissingSession(String),

    /// A stored value no longer matches the domain rules.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Classify a sqlx error: unique violations on `uq_` constraints become
    /// [`StoreError::Duplicate`], foreign key violations become
    /// [`StoreError::MissingSession`] for `session_id`.
    pub fn from_sqlx(err: sqlx::Error, session_id: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return StoreError::Duplicate(constraint.to_string());
                }
            }
            // PostgreSQL foreign key violation: error code 23503
            if db_err.code().as_deref() == Some("23503") {
                return StoreError::MissingSession(session_id.to_string());
            }
        }
        StoreError::Database(err)
    }
}

impl From<StoreError> for CoreError {
    /// Persistence failures reach callers as a generic failure; only key
    /// collisions keep their meaning.
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(key) => CoreError::Conflict(format!("Duplicate key: {key}")),
            StoreError::MissingSession(id) => CoreError::not_found("Session", id),
            other => CoreError::Internal(other.to_string()),
        }
    }
}
