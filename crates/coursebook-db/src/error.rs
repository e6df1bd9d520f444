use anyhow::anyhow;
use thiserror::Error;

use coursebook_core::AppError;

/// Failures reported by a [`Store`](crate::Store).
///
/// `NotFound` is only produced by writes that target a missing row; lookups
/// report absence as `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::not_found(anyhow!("Resource not found")),
            StoreError::DuplicateEmail => AppError::conflict("Email already registered"),
            other => AppError::database(other),
        }
    }
}

impl StoreError {
    /// Converts to an [`AppError`], naming the missing resource on `NotFound`.
    pub fn with_not_found(self, message: &'static str) -> AppError {
        match self {
            StoreError::NotFound => AppError::not_found(anyhow!(message)),
            other => other.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_categories() {
        assert_eq!(AppError::from(StoreError::NotFound).code(), "not_found");
        assert_eq!(AppError::from(StoreError::DuplicateEmail).code(), "conflict");

        let err = AppError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(err.code(), "internal_error");
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_with_not_found_names_resource() {
        let err = StoreError::NotFound.with_not_found("Course not found");
        assert_eq!(err.error.to_string(), "Course not found");

        let err = StoreError::DuplicateEmail.with_not_found("Course not found");
        assert_eq!(err.code(), "conflict");
    }
}
