use std::error::Error;
use thiserror::Error;

/// Result alias for catalog operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by run catalog backends regardless of where runs are kept.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or failed while serving the request.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human-readable context.
        message: String,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A run addressed by identifier does not exist in the catalog.
    #[error("run `{0}` not found in catalog")]
    UnknownRun(i64),
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
