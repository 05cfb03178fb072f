//! Error types for AMS core operations.

use ams_types::AmsError;
use thiserror::Error;

use crate::store::StoreError;

/// Errors raised below the API layer.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoreError {
    /// Domain validation or lookup failure, surfaced to API callers.
    #[error(transparent)]
    Ams(#[from] AmsError),

    /// Key-value persistence failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Outbound HTTP request failed.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Converts into the API-facing error, folding infrastructure failures into `Internal`.
    pub fn into_ams(self) -> AmsError {
        match self {
            Self::Ams(e) => e,
            other => AmsError::internal(other.to_string()),
        }
    }
}

impl From<ams_types::RegistrationError> for CoreError {
    fn from(e: ams_types::RegistrationError) -> Self {
        Self::Ams(e.into())
    }
}

impl From<ams_types::SubscriptionError> for CoreError {
    fn from(e: ams_types::SubscriptionError) -> Self {
        Self::Ams(e.into())
    }
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
