use crate::types::WorkoutId;
use thiserror::Error;

/// Errors raised by the workout store and its collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// A required numeric field is non-finite or out of range.
    #[error("Inputs have to be positive numbers ({0})")]
    Validation(String),

    /// An operation referenced an id that is not in the collection.
    #[error("No workout with id {0}")]
    NotFound(WorkoutId),

    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    /// Reading or writing the local key/value store failed.
    #[error("Storage error: {0}")]
    Persistence(String),
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}

/// Why the current position could not be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("User denied the request for Geolocation.")]
    PermissionDenied,
    #[error("Location information is unavailable.")]
    PositionUnavailable,
    #[error("The request to get user location timed out.")]
    Timeout,
    #[error("An unknown error occurred.")]
    Unknown,
}

pub type Result<T> = std::result::Result<T, Error>;
