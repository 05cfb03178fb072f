//! Registration-related errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by the app mobility service registration API.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum RegistrationError {
    /// Neither or both of appInstanceId / mepId were supplied
    #[error("Service Consumer Id parameter should contain either AppInstanceId or MepId")]
    InvalidConsumer,

    /// Service consumer object absent from the body
    #[error("Service Consumer Id parameter not present")]
    MissingConsumer,

    /// A device binding has no associate identity value
    #[error("Device information entry {index} is missing a non-empty associateId")]
    MissingAssociateId {
        /// Position of the offending entry in deviceInformation
        index: usize,
    },

    /// Path id and body id differ on replace
    #[error("ServiceId {path_id} passed in parameters not matching the serviceId {body_id} in the RegistrationInfo")]
    IdMismatch {
        /// Identifier taken from the request path
        path_id: String,
        /// Identifier found in the request body
        body_id: String,
    },

    /// No registration stored under this id
    #[error("Registration not found: {id}")]
    NotFound {
        /// Requested service id
        id: String,
    },

    /// No registration stored at all
    #[error("No registrations found")]
    NoneRegistered,

    /// Body could not be decoded
    #[error("Malformed registration body: {message}")]
    Malformed {
        /// Decoder message
        message: String,
    },
}

impl RegistrationError {
    /// HTTP status code for this error.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } | Self::NoneRegistered => 404,
            Self::InvalidConsumer
            | Self::MissingConsumer
            | Self::MissingAssociateId { .. }
            | Self::IdMismatch { .. }
            | Self::Malformed { .. } => 400,
        }
    }
}
