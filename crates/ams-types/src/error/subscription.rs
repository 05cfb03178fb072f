//! Subscription-related errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by the mobility procedure / adjacent app info subscription API.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum SubscriptionError {
    #[error("Mandatory CallbackReference parameter not present")]
    MissingCallback,

    #[error("FilterCriteria with a non-empty appInstanceId is mandatory for this subscription type")]
    MissingFilter,

    #[error("Unsupported subscription type: {subscription_type}")]
    UnknownType { subscription_type: String },

    #[error("Mandatory Link parameter not present")]
    MissingLink,

    #[error("SubscriptionId {path_id} in endpoint and {body_id} in body not matching")]
    IdMismatch { path_id: String, body_id: String },

    #[error("Filtered appInstanceId cannot change from {original} to {requested}")]
    FilterChanged { original: String, requested: String },

    #[error("Subscription {id} is of a different type")]
    TypeChanged { id: String },

    #[error("Subscription not found: {id}")]
    NotFound { id: String },

    #[error("Query param not valid: {param}")]
    InvalidQuery { param: String },

    #[error("Malformed subscription body: {message}")]
    Malformed { message: String },
}

impl SubscriptionError {
    /// HTTP status code for this error.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::MissingCallback
            | Self::MissingFilter
            | Self::UnknownType { .. }
            | Self::MissingLink
            | Self::IdMismatch { .. }
            | Self::FilterChanged { .. }
            | Self::TypeChanged { .. }
            | Self::InvalidQuery { .. }
            | Self::Malformed { .. } => 400,
        }
    }
}
