use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures raised by a store backend. Never retried by the store itself.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Backend unreachable or returned a transport error
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored document could not be encoded or decoded
    #[error("corrupt document {id} in {table}: {reason}")]
    Corrupt {
        table: String,
        id: String,
        reason: String,
    },
}

impl StoreError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }
}
