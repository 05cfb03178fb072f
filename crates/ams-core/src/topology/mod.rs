//! Read-only view of the active scenario's network topology.

mod scenario;

pub use scenario::ScenarioTopology;

use std::collections::HashMap;

use ams_types::TopologyError;

/// Where a device currently sits in the topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceLocation {
    pub address: String,
    pub attachment_point: String,
    pub zone: String,
    pub connected: bool,
}

/// Queries the resolver and the tracker need from a topology.
pub trait TopologyView: Send + Sync {
    /// Names of every network attachment point, sorted.
    fn attachment_points(&self) -> Vec<String>;

    /// Zone an attachment point belongs to.
    fn zone_of(&self, attachment_point: &str) -> Result<String, TopologyError>;

    /// Edge and fog nodes able to host application instances, sorted.
    fn candidate_nodes(&self) -> Vec<String>;

    fn contains_node(&self, name: &str) -> bool;

    /// Shortest-path distance from `source` to every reachable graph node.
    fn distances_from(&self, source: &str) -> Result<HashMap<String, i64>, TopologyError>;

    /// Every device in the scenario, sorted by address.
    fn devices(&self) -> Vec<DeviceLocation>;
}
