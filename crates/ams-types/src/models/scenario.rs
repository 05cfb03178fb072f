//! Scenario description consumed by the topology builder.
//!
//! Only the members needed to place devices, attachment points and compute
//! nodes are modelled; unknown members are ignored on decode.

use serde::{Deserialize, Serialize};

/// Zone type used for a domain's implicit default zone.
pub const COMMON_ZONE: &str = "COMMON";
/// Network location type used for a zone's implicit default location.
pub const DEFAULT_NETWORK_LOCATION: &str = "DEFAULT";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub deployment: Deployment,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    #[serde(default)]
    pub domains: Vec<Domain>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub name: String,
    #[serde(rename = "type", default)]
    pub domain_type: String,
    #[serde(default)]
    pub zones: Vec<Zone>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub name: String,
    #[serde(rename = "type", default)]
    pub zone_type: String,
    #[serde(default)]
    pub network_locations: Vec<NetworkLocation>,
}

impl Zone {
    pub fn is_default(&self) -> bool {
        self.zone_type == COMMON_ZONE
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NetworkLocation {
    pub name: String,
    #[serde(rename = "type", default)]
    pub location_type: String,
    #[serde(default)]
    pub physical_locations: Vec<PhysicalLocation>,
}

impl NetworkLocation {
    pub fn is_default(&self) -> bool {
        self.location_type == DEFAULT_NETWORK_LOCATION
    }

    /// Points of attachment (`POA`, `POA-4G`, `POA-WIFI`, ...).
    pub fn is_attachment_point(&self) -> bool {
        self.location_type.starts_with("POA")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalLocation {
    pub name: String,
    #[serde(rename = "type", default)]
    pub location_type: String,
    /// Device address; the node name is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected: Option<bool>,
}

impl PhysicalLocation {
    /// Edge and fog nodes can host application instances.
    pub fn is_compute_node(&self) -> bool {
        matches!(self.location_type.as_str(), "EDGE" | "FOG")
    }

    pub fn is_device(&self) -> bool {
        self.location_type == "UE"
    }

    pub fn device_address(&self) -> &str {
        self.address.as_deref().filter(|a| !a.is_empty()).unwrap_or(&self.name)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.unwrap_or(true)
    }
}
