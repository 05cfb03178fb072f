//! Small value types shared by registrations, subscriptions and notifications.

use serde::{Deserialize, Serialize};

/// Seconds + nanoseconds timestamp as carried on the MEC wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimeStamp {
    pub seconds: i64,
    #[serde(default)]
    pub nano_seconds: i32,
}

impl TimeStamp {
    pub fn now() -> Self {
        let now = chrono::Utc::now();
        Self {
            seconds: now.timestamp(),
            nano_seconds: i32::try_from(now.timestamp_subsec_nanos()).unwrap_or_default(),
        }
    }

    pub const fn from_seconds(seconds: i64) -> Self {
        Self { seconds, nano_seconds: 0 }
    }

    /// True once `now` has reached this deadline (second resolution).
    pub const fn has_passed(&self, now: &Self) -> bool {
        self.seconds <= now.seconds
    }
}

/// Hyperlink object used for `_links` members.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LinkType {
    pub href: String,
}

impl LinkType {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }

    /// Last path segment of the link, which carries the resource id.
    pub fn trailing_id(&self) -> &str {
        self.href.rsplit('/').next().unwrap_or_default()
    }
}

/// Kind of identifier used to address a device.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssociateIdType {
    #[serde(rename = "UE_IPv4_ADDRESS")]
    UeIpv4Address,
    #[serde(rename = "UE_IPV6_ADDRESS")]
    UeIpv6Address,
    #[serde(rename = "NATED_IP_ADDRESS")]
    NatedIpAddress,
    #[serde(rename = "GTP_TEID")]
    GtpTeid,
}

/// Typed device identity, e.g. an IPv4 address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssociateId {
    #[serde(rename = "type")]
    pub id_type: AssociateIdType,
    pub value: String,
}

impl AssociateId {
    pub fn ipv4(value: impl Into<String>) -> Self {
        Self { id_type: AssociateIdType::UeIpv4Address, value: value.into() }
    }
}
