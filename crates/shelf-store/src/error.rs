//! Error types for the store crate.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A lookup by primary key found nothing.
    #[error("{entity} {id} does not exist")]
    NotFound { entity: &'static str, id: String },

    /// Registration with a username that is already in use.
    #[error("a user with that username already exists")]
    UsernameTaken,

    /// Hashing or parsing a password hash failed.
    #[error("password hash error: {0}")]
    PasswordHash(String),

    /// A session lifetime that cannot be added to the current time.
    #[error("session lifetime {0} is out of range")]
    SessionLifetime(chrono::Duration),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying migrations failed.
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// IO error while preparing the database file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Whether this error is a failed lookup.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
