//! Preferred-node resolver: ranks candidate nodes for every attachment point.

use std::collections::{BTreeMap, HashMap};

use ams_types::PreferredNodeRanking;
use tracing::{debug, warn};

use crate::topology::TopologyView;

/// Rankings keyed by attachment point name.
pub type RankingMap = BTreeMap<String, PreferredNodeRanking>;

/// Computes rankings either from a static zone mapping or from hop counts.
///
/// The mode is fixed at construction: a non-empty zone mapping selects static mode.
#[derive(Debug, Clone, Default)]
pub struct PreferredNodeResolver {
    zone_node_map: HashMap<String, String>,
}

impl PreferredNodeResolver {
    pub fn new(zone_node_map: HashMap<String, String>) -> Self {
        Self { zone_node_map }
    }

    pub fn is_static(&self) -> bool {
        !self.zone_node_map.is_empty()
    }

    /// Recomputes every ranking from scratch. Failures skip the affected entry.
    pub fn refresh_rankings(&self, topology: &dyn TopologyView) -> RankingMap {
        let rankings = if self.is_static() {
            self.static_rankings(topology)
        } else {
            Self::hop_count_rankings(topology)
        };
        debug!(count = rankings.len(), static_mode = self.is_static(), "Rankings refreshed");
        rankings
    }

    fn static_rankings(&self, topology: &dyn TopologyView) -> RankingMap {
        let mut rankings = RankingMap::new();
        for poa in topology.attachment_points() {
            let zone = match topology.zone_of(&poa) {
                Ok(zone) => zone,
                Err(e) => {
                    warn!(poa = %poa, "Skipping attachment point: {}", e);
                    continue;
                }
            };
            match self.zone_node_map.get(&zone) {
                Some(node) => {
                    rankings.insert(poa, PreferredNodeRanking::single(node.clone()));
                }
                None => warn!(poa = %poa, zone = %zone, "No node mapped for zone"),
            }
        }
        rankings
    }

    fn hop_count_rankings(topology: &dyn TopologyView) -> RankingMap {
        let candidates = topology.candidate_nodes();
        let mut rankings = RankingMap::new();

        for poa in topology.attachment_points() {
            let distances = match topology.distances_from(&poa) {
                Ok(distances) => distances,
                Err(e) => {
                    warn!(poa = %poa, "Skipping attachment point: {}", e);
                    continue;
                }
            };

            let reachable = candidates.iter().filter_map(|node| {
                if !topology.contains_node(node) {
                    warn!(poa = %poa, node = %node, "Candidate node missing from graph");
                    return None;
                }
                let distance = distances.get(node).copied();
                if distance.is_none() {
                    debug!(poa = %poa, node = %node, "Candidate unreachable");
                }
                distance.map(|d| (node.as_str(), d))
            });

            rankings.insert(poa.clone(), PreferredNodeRanking::from_distances(reachable));
        }
        rankings
    }
}
