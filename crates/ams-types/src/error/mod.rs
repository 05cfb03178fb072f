//! Typed error definitions for the Application Mobility Service.
//!
//! This module provides a structured error hierarchy with specific error types
//! for each API surface. All errors are designed to be:
//!
//! - **Serializable** for API responses via serde
//! - **Displayable** for logging via Display trait
//! - **Matchable** for error handling logic via enum variants
//! - **Composable** via thiserror derive macros

mod config;
mod registration;
mod subscription;
mod topology;

pub use config::ConfigError;
pub use registration::RegistrationError;
pub use subscription::SubscriptionError;
pub use topology::TopologyError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type that wraps all domain-specific errors.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "domain", content = "error")]
pub enum AmsError {
    /// Wraps a registration API error
    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// Wraps a subscription API error
    #[error("Subscription error: {0}")]
    Subscription(#[from] SubscriptionError),

    /// Wraps a topology lookup error
    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    /// Wraps a configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Unexpected internal failure (serialization, poisoned state)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AmsError {
    /// HTTP status code this error maps to on the REST surface.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Registration(e) => e.status_code(),
            Self::Subscription(e) => e.status_code(),
            Self::Topology(_) => 404,
            Self::Config(_) | Self::Internal { .. } => 500,
        }
    }

    /// Human readable detail without the domain prefix, for problem-details bodies.
    pub fn detail(&self) -> String {
        match self {
            Self::Registration(e) => e.to_string(),
            Self::Subscription(e) => e.to_string(),
            Self::Topology(e) => e.to_string(),
            Self::Config(e) => e.to_string(),
            Self::Internal { message } => message.clone(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }
}

/// Standard Result type using AmsError.
pub type Result<T> = std::result::Result<T, AmsError>;
