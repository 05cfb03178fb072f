//! Outbound notification payloads and the inbound trigger notification.

use serde::{Deserialize, Serialize};

use super::common::{AssociateId, TimeStamp};

pub const MOBILITY_PROCEDURE_NOTIFICATION: &str = "MobilityProcedureNotification";
pub const ADJACENT_APP_INFO_NOTIFICATION: &str = "AdjacentAppInfoNotification";
pub const EXPIRY_NOTIFICATION: &str = "ExpiryNotification";
pub const TRIGGER_NOTIFICATION: &str = "TriggerNotification";
pub const APP_TERMINATION_NOTIFICATION: &str = "AppTerminationNotification";

/// Phase of an inter-host move reported to subscribers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MobilityStatus {
    InterhostMoveoutTriggered,
    InterhostMoveoutCompleted,
    InterhostMoveoutFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TargetAppInfo {
    pub app_instance_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MobilityProcedureNotification {
    pub notification_type: String,
    pub time_stamp: TimeStamp,
    pub mobility_status: MobilityStatus,
    pub target_app_info: TargetAppInfo,
    pub associate_id: Vec<AssociateId>,
}

impl MobilityProcedureNotification {
    /// A move-out-triggered notice for one device, stamped now.
    pub fn triggered(target_app_instance_id: impl Into<String>, associate_id: AssociateId) -> Self {
        Self {
            notification_type: MOBILITY_PROCEDURE_NOTIFICATION.to_string(),
            time_stamp: TimeStamp::now(),
            mobility_status: MobilityStatus::InterhostMoveoutTriggered,
            target_app_info: TargetAppInfo { app_instance_id: target_app_instance_id.into() },
            associate_id: vec![associate_id],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdjacentAppInfo {
    pub app_instance_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdjacentAppInfoNotification {
    pub notification_type: String,
    pub time_stamp: TimeStamp,
    pub adjacent_app_info: Vec<AdjacentAppInfo>,
}

impl AdjacentAppInfoNotification {
    pub fn new<I, S>(instance_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            notification_type: ADJACENT_APP_INFO_NOTIFICATION.to_string(),
            time_stamp: TimeStamp::now(),
            adjacent_app_info: instance_ids
                .into_iter()
                .map(|id| AdjacentAppInfo { app_instance_id: id.into() })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpiryNotificationLinks {
    /// Callback reference of the expired subscription.
    #[serde(rename = "self")]
    pub self_link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryNotification {
    pub notification_type: String,
    #[serde(rename = "_links")]
    pub links: ExpiryNotificationLinks,
    pub time_stamp: TimeStamp,
    pub expiry_deadline: TimeStamp,
}

impl ExpiryNotification {
    pub fn new(callback_reference: impl Into<String>, expiry_deadline: TimeStamp) -> Self {
        Self {
            notification_type: EXPIRY_NOTIFICATION.to_string(),
            links: ExpiryNotificationLinks { self_link: callback_reference.into() },
            time_stamp: TimeStamp::now(),
            expiry_deadline,
        }
    }
}

/// Common header used to dispatch inbound notifications by type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NotificationCommon {
    #[serde(default)]
    pub notification_type: String,
}

/// Manual mobility trigger posted on the app termination endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TriggerNotification {
    pub notification_type: String,
    pub app_instance_id: String,
    pub associate_id: AssociateId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_mep: Option<String>,
}
