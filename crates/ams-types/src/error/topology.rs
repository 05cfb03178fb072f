//! Topology lookup errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while querying the active scenario topology.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum TopologyError {
    /// Node name is not part of the network graph
    #[error("Node {name} not found in network graph")]
    UnknownNode { name: String },

    /// Attachment point has no parent zone, or the zone has no static mapping
    #[error("No zone mapping for {name}")]
    UnknownZone { name: String },
}
