//! [`TopologyView`] built from a scenario description.

use std::collections::{BTreeMap, HashMap};

use ams_types::models::Scenario;
use ams_types::TopologyError;
use petgraph::algo::dijkstra;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use tracing::warn;

use super::{DeviceLocation, TopologyView};

/// Weighted element tree of one scenario.
///
/// Every element is linked to its parent with weight 1, except default zones and
/// default network locations which are transparent (weight 0). Domains have no
/// parent, so each operator domain is a separate component.
#[derive(Debug, Default)]
pub struct ScenarioTopology {
    graph: UnGraph<String, i64>,
    index: HashMap<String, NodeIndex>,
    zone_of_poa: BTreeMap<String, String>,
    candidates: Vec<String>,
    devices: Vec<DeviceLocation>,
}

impl ScenarioTopology {
    pub fn new(scenario: &Scenario) -> Self {
        let mut topo = Self::default();

        for domain in &scenario.deployment.domains {
            let domain_ix = topo.add_node(&domain.name);

            for zone in &domain.zones {
                let zone_ix = topo.add_node(&zone.name);
                topo.link(domain_ix, zone_ix, if zone.is_default() { 0 } else { 1 });

                for netloc in &zone.network_locations {
                    let netloc_ix = topo.add_node(&netloc.name);
                    topo.link(zone_ix, netloc_ix, if netloc.is_default() { 0 } else { 1 });
                    if netloc.is_attachment_point() {
                        topo.zone_of_poa.insert(netloc.name.clone(), zone.name.clone());
                    }

                    for physloc in &netloc.physical_locations {
                        if physloc.is_device() {
                            // Devices are placed, not routed through.
                            topo.devices.push(DeviceLocation {
                                address: physloc.device_address().to_string(),
                                attachment_point: netloc.name.clone(),
                                zone: zone.name.clone(),
                                connected: physloc.is_connected(),
                            });
                            continue;
                        }
                        let phys_ix = topo.add_node(&physloc.name);
                        topo.link(netloc_ix, phys_ix, 1);
                        if physloc.is_compute_node() {
                            topo.candidates.push(physloc.name.clone());
                        }
                    }
                }
            }
        }

        topo.candidates.sort();
        topo.candidates.dedup();
        topo.devices.sort_by(|a, b| a.address.cmp(&b.address));
        topo
    }

    fn add_node(&mut self, name: &str) -> NodeIndex {
        if let Some(ix) = self.index.get(name) {
            warn!(node = %name, "Duplicate element name in scenario, reusing first");
            return *ix;
        }
        let ix = self.graph.add_node(name.to_string());
        self.index.insert(name.to_string(), ix);
        ix
    }

    fn link(&mut self, parent: NodeIndex, child: NodeIndex, weight: i64) {
        if parent != child {
            self.graph.update_edge(parent, child, weight);
        }
    }
}

impl TopologyView for ScenarioTopology {
    fn attachment_points(&self) -> Vec<String> {
        self.zone_of_poa.keys().cloned().collect()
    }

    fn zone_of(&self, attachment_point: &str) -> Result<String, TopologyError> {
        self.zone_of_poa
            .get(attachment_point)
            .cloned()
            .ok_or_else(|| TopologyError::UnknownZone { name: attachment_point.to_string() })
    }

    fn candidate_nodes(&self) -> Vec<String> {
        self.candidates.clone()
    }

    fn contains_node(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn distances_from(&self, source: &str) -> Result<HashMap<String, i64>, TopologyError> {
        let start = *self
            .index
            .get(source)
            .ok_or_else(|| TopologyError::UnknownNode { name: source.to_string() })?;

        Ok(dijkstra(&self.graph, start, None, |edge| *edge.weight())
            .into_iter()
            .map(|(ix, distance)| (self.graph[ix].clone(), distance))
            .collect())
    }

    fn devices(&self) -> Vec<DeviceLocation> {
        self.devices.clone()
    }
}
