//! # AMS Types
//!
//! Core types, models, and error definitions for the Application Mobility Service.
//!
//! This crate provides the foundational type system for the AMS workspace:
//!
//! - **`error`** - Typed error hierarchy for registrations, subscriptions, topology and config
//! - **`models`** - Wire models (registrations, subscriptions, notifications), preferred-node
//!   rankings, application instances, scenario descriptions and service configuration
//!
//! ## Architecture Role
//!
//! `ams-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!                ams-types (this crate)
//!                        │
//!                        ▼
//!                    ams-core
//!                        │
//!                        ▼
//!                   ams-server
//! ```
//!
//! All wire types serialize with the camelCase field names of the MEC 021 API.

pub mod error;
pub mod models;

// Re-export error types for convenience
pub use error::{AmsError, ConfigError, RegistrationError, Result, SubscriptionError, TopologyError};

// Re-export core model types
pub use models::{
    AdjacentAppInfoNotification, AdjacentAppInfoSubscription, AmsConfig, AppMobilityServiceLevel,
    ApplicationInstance, AssociateId, AssociateIdType, ContextTransferState, DeviceInformation,
    MobilityProcedureNotification, MobilityProcedureSubscription, MobilityStatus,
    PreferredNodeRanking, RegistrationInfo, Scenario, ServiceConsumerId, Subscription, TimeStamp,
    TrackedDevice,
};
