//! Storage-specific error type wrapping sqlx errors.

use agenda_domain::error::AgendaError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// A record could not be encoded to or decoded from JSON.
    #[error("JSON encoding error")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for AgendaError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
