//! Core domain models for the Application Mobility Service.
//!
//! This module contains all shared data structures used across the AMS workspace.

mod application;
mod common;
mod config;
mod notification;
mod ranking;
mod registration;
mod scenario;
mod subscription;

// Re-export all models
pub use application::ApplicationInstance;
pub use common::{AssociateId, AssociateIdType, LinkType, TimeStamp};
pub use config::{AmsConfig, NotificationConfig, DEFAULT_MEP_NAME};
pub use notification::{
    AdjacentAppInfo, AdjacentAppInfoNotification, ExpiryNotification, ExpiryNotificationLinks,
    MobilityProcedureNotification, MobilityStatus, NotificationCommon,
    TargetAppInfo, TriggerNotification, ADJACENT_APP_INFO_NOTIFICATION,
    APP_TERMINATION_NOTIFICATION, EXPIRY_NOTIFICATION, MOBILITY_PROCEDURE_NOTIFICATION,
    TRIGGER_NOTIFICATION,
};
pub use ranking::PreferredNodeRanking;
pub use registration::{
    AppMobilityServiceLevel, ContextTransferState, DeviceInformation, RegistrationInfo,
    ServiceConsumer, ServiceConsumerId, TrackedDevice,
};
pub use scenario::{
    Deployment, Domain, NetworkLocation, PhysicalLocation, Scenario, Zone, COMMON_ZONE,
    DEFAULT_NETWORK_LOCATION,
};
pub use subscription::{
    AdjacentAppInfoFilter, AdjacentAppInfoSubscription, MobilityProcedureFilter,
    MobilityProcedureSubscription, Subscription, SubscriptionKind, SubscriptionLinkList,
    SubscriptionLinkListEntry, SubscriptionLinks, WebsockNotifConfig,
};
