//! Errors surfaced by the catalog services.

use bookshelf_db::StoreError;
use bookshelf_http::AppError;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed input, e.g. an empty title
    #[error("{0}")]
    Validation(String),

    /// Reserved for explicit not-found signaling; lookups return `None` instead
    #[error("{0}")]
    NotFound(String),

    /// Duplicate book title
    #[error("{0}")]
    Conflict(String),

    /// Store failure while persisting a write
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: StoreError,
    },

    /// Store failure on a path that propagates it untouched
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ServiceError {
    pub fn empty_title() -> Self {
        Self::Validation("Book title cannot be empty.".to_string())
    }

    pub fn empty_author_name() -> Self {
        Self::Validation("Author name cannot be empty.".to_string())
    }

    pub fn duplicate_title(title: &str) -> Self {
        Self::Conflict(format!("A book with title \"{}\" already exists.", title))
    }

    pub fn book_not_found(id: &str) -> Self {
        Self::NotFound(format!("Book with ID \"{}\" not found.", id))
    }

    pub fn author_not_found(id: &str) -> Self {
        Self::NotFound(format!("Author with ID \"{}\" not found.", id))
    }

    /// Wrap a store failure from a write as `Database <operation> operation failed.`
    pub fn write_failed(operation: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Internal {
            message: format!("Database {} operation failed.", operation),
            source,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::Validation(message) => AppError::validation(Vec::new(), message),
            ServiceError::NotFound(message) => AppError::not_found(message),
            ServiceError::Conflict(message) => {
                AppError::conflict(vec![serde_json::json!({"field": "title"})], message)
            }
            ServiceError::Internal { message, source } => {
                AppError::Internal(anyhow::Error::new(source).context(message))
            }
            ServiceError::Store(source) => AppError::Internal(source.into()),
            ServiceError::Encode(source) => AppError::Internal(source.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn kinds_map_to_statuses() {
        let cases = [
            (ServiceError::empty_title(), StatusCode::UNPROCESSABLE_ENTITY),
            (ServiceError::duplicate_title("Dune"), StatusCode::CONFLICT),
            (ServiceError::book_not_found("b1"), StatusCode::NOT_FOUND),
            (
                ServiceError::write_failed("put")(StoreError::unavailable("down")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ServiceError::Store(StoreError::unavailable("down")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(AppError::from(error).status(), status);
        }
    }

    #[test]
    fn internal_error_keeps_operation_message() {
        let error = ServiceError::write_failed("put")(StoreError::unavailable("timeout"));
        assert_eq!(error.to_string(), "Database put operation failed.");
        let app: AppError = error.into();
        assert_eq!(app.to_string(), "Database put operation failed.");
    }
}
