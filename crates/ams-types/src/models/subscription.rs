//! Mobility procedure and adjacent app info subscriptions.

use serde::{Deserialize, Serialize};

use super::common::{AssociateId, LinkType, TimeStamp};
use super::notification::MobilityStatus;
use crate::error::SubscriptionError;

/// `_links` member of a subscription resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SubscriptionLinks {
    #[serde(rename = "self")]
    pub self_link: LinkType,
}

/// Websocket delivery preference. Stored and echoed, never used for delivery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WebsockNotifConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub websocket_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_websocket_uri: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MobilityProcedureFilter {
    #[serde(default)]
    pub app_instance_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associate_id: Vec<AssociateId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mobility_status: Vec<MobilityStatus>,
}

impl MobilityProcedureFilter {
    /// An empty associate list matches every device.
    pub fn matches_associate(&self, associate_id: &AssociateId) -> bool {
        self.associate_id.is_empty() || self.associate_id.contains(associate_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdjacentAppInfoFilter {
    #[serde(default)]
    pub app_instance_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MobilityProcedureSubscription {
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<SubscriptionLinks>,
    #[serde(default)]
    pub callback_reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_test_notification: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub websock_notif_config: Option<WebsockNotifConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_deadline: Option<TimeStamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_criteria: Option<MobilityProcedureFilter>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdjacentAppInfoSubscription {
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<SubscriptionLinks>,
    #[serde(default)]
    pub callback_reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_test_notification: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub websock_notif_config: Option<WebsockNotifConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_deadline: Option<TimeStamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_criteria: Option<AdjacentAppInfoFilter>,
}

/// A subscription resource, discriminated by `subscriptionType`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "subscriptionType")]
pub enum Subscription {
    #[serde(rename = "MobilityProcedureSubscription")]
    MobilityProcedure(MobilityProcedureSubscription),
    #[serde(rename = "AdjacentAppInfoSubscription")]
    AdjacentAppInfo(AdjacentAppInfoSubscription),
}

/// Subscription discriminant, also used as the list query value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SubscriptionKind {
    #[serde(rename = "MobilityProcedureSubscription")]
    MobilityProcedure,
    #[serde(rename = "AdjacentAppInfoSubscription")]
    AdjacentAppInfo,
}

impl SubscriptionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MobilityProcedure => "MobilityProcedureSubscription",
            Self::AdjacentAppInfo => "AdjacentAppInfoSubscription",
        }
    }

    /// Value accepted by the `subscriptionType` list query parameter.
    pub const fn as_query(self) -> &'static str {
        match self {
            Self::MobilityProcedure => "mobility_proc",
            Self::AdjacentAppInfo => "adj_app_info",
        }
    }

    pub fn from_query(value: &str) -> Option<Self> {
        match value {
            "mobility_proc" => Some(Self::MobilityProcedure),
            "adj_app_info" => Some(Self::AdjacentAppInfo),
            _ => None,
        }
    }
}

impl Subscription {
    /// Decodes a request body, mapping unknown types and bad JSON to typed errors.
    pub fn from_json(body: serde_json::Value) -> Result<Self, SubscriptionError> {
        let kind = body.get("subscriptionType").and_then(serde_json::Value::as_str).unwrap_or("");
        if kind != SubscriptionKind::MobilityProcedure.as_str()
            && kind != SubscriptionKind::AdjacentAppInfo.as_str()
        {
            return Err(SubscriptionError::UnknownType { subscription_type: kind.to_string() });
        }
        serde_json::from_value(body)
            .map_err(|e| SubscriptionError::Malformed { message: e.to_string() })
    }

    pub const fn kind(&self) -> SubscriptionKind {
        match self {
            Self::MobilityProcedure(_) => SubscriptionKind::MobilityProcedure,
            Self::AdjacentAppInfo(_) => SubscriptionKind::AdjacentAppInfo,
        }
    }

    pub fn callback_reference(&self) -> &str {
        match self {
            Self::MobilityProcedure(s) => &s.callback_reference,
            Self::AdjacentAppInfo(s) => &s.callback_reference,
        }
    }

    pub const fn expiry_deadline(&self) -> Option<TimeStamp> {
        match self {
            Self::MobilityProcedure(s) => s.expiry_deadline,
            Self::AdjacentAppInfo(s) => s.expiry_deadline,
        }
    }

    /// Consumer application instance the subscription filters on.
    pub fn filter_app_instance_id(&self) -> Option<&str> {
        let id = match self {
            Self::MobilityProcedure(s) => s.filter_criteria.as_ref().map(|f| f.app_instance_id.as_str()),
            Self::AdjacentAppInfo(s) => s.filter_criteria.as_ref().map(|f| f.app_instance_id.as_str()),
        };
        id.filter(|id| !id.is_empty())
    }

    pub fn links(&self) -> Option<&SubscriptionLinks> {
        match self {
            Self::MobilityProcedure(s) => s.links.as_ref(),
            Self::AdjacentAppInfo(s) => s.links.as_ref(),
        }
    }

    /// Id carried in the `_links.self` href, if any.
    pub fn self_id(&self) -> Option<&str> {
        self.links().map(|l| l.self_link.trailing_id()).filter(|id| !id.is_empty())
    }

    pub fn set_self_link(&mut self, href: impl Into<String>) {
        let links = Some(SubscriptionLinks { self_link: LinkType::new(href) });
        match self {
            Self::MobilityProcedure(s) => s.links = links,
            Self::AdjacentAppInfo(s) => s.links = links,
        }
    }

    /// Checks mandatory members and fills in defaulted filter values.
    pub fn validate_and_normalize(&mut self) -> Result<(), SubscriptionError> {
        if self.callback_reference().is_empty() {
            return Err(SubscriptionError::MissingCallback);
        }
        if self.filter_app_instance_id().is_none() {
            return Err(SubscriptionError::MissingFilter);
        }
        if let Self::MobilityProcedure(s) = self {
            if let Some(filter) = s.filter_criteria.as_mut() {
                if filter.mobility_status.is_empty() {
                    filter.mobility_status.push(MobilityStatus::InterhostMoveoutTriggered);
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionLinkListEntry {
    pub href: String,
    pub subscription_type: SubscriptionKind,
}

/// Response body of the subscription list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SubscriptionLinkList {
    #[serde(rename = "_links")]
    pub links: SubscriptionLinks,
    #[serde(default)]
    pub subscription: Vec<SubscriptionLinkListEntry>,
}
