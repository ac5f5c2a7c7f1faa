use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::storage::StorageError,
    services::notifier::NotifyError,
    state::{progression::BoundaryError, run::ParticipantError, timer::InvalidStateTransition},
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Command not allowed in the current timer state.
    #[error(transparent)]
    InvalidStateTransition(#[from] InvalidStateTransition),
    /// Run switch past either end of the schedule.
    #[error(transparent)]
    Boundary(#[from] BoundaryError),
    /// Participant index unknown or already finished.
    #[error(transparent)]
    Participant(#[from] ParticipantError),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Run catalog could not serve the request.
    #[error("run catalog unavailable")]
    Unavailable(#[source] StorageError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

/// Failure of an external collaborator. Logged, never returned to a command caller.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// Catalog read or write failed.
    #[error("catalog: {0}")]
    Catalog(#[from] StorageError),
    /// Notification delivery failed.
    #[error("notifier: {0}")]
    Notifier(#[from] NotifyError),
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("{0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("{0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("{0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("{0}")]
    ServiceUnavailable(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::InvalidStateTransition(_) | ServiceError::Boundary(_) => {
                AppError::Conflict(message)
            }
            ServiceError::Participant(ParticipantError::OutOfRange { .. }) => {
                AppError::NotFound(message)
            }
            ServiceError::Participant(ParticipantError::AlreadyFinished(_)) => {
                AppError::Conflict(message)
            }
            ServiceError::InvalidInput(_) => AppError::BadRequest(message),
            ServiceError::NotFound(_) => AppError::NotFound(message),
            ServiceError::Unavailable(source) => {
                AppError::ServiceUnavailable(format!("{message}: {source}"))
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
