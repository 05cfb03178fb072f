//! Preferred-node ranking for a single attachment point.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Ordered tiers of equally preferred node names, closest tier first.
///
/// The representation is kept canonical (names sorted inside each tier, no
/// empty tiers, no duplicate names) so that derived `PartialEq` is a correct
/// change detector: two rankings compare equal exactly when they would drive
/// the same owner selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Vec<String>>", into = "Vec<Vec<String>>")]
pub struct PreferredNodeRanking {
    tiers: Vec<Vec<String>>,
}

impl PreferredNodeRanking {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ranking with one tier holding a single node (static zone mapping).
    pub fn single(node: impl Into<String>) -> Self {
        Self { tiers: vec![vec![node.into()]] }
    }

    /// Groups `(node, distance)` pairs into tiers ordered by ascending distance.
    ///
    /// A node reported at several distances is kept at the shortest one.
    pub fn from_distances<I, S>(distances: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let mut best: BTreeMap<String, i64> = BTreeMap::new();
        for (node, distance) in distances {
            let entry = best.entry(node.into()).or_insert(distance);
            if distance < *entry {
                *entry = distance;
            }
        }

        let mut grouped: BTreeMap<i64, BTreeSet<String>> = BTreeMap::new();
        for (node, distance) in best {
            grouped.entry(distance).or_default().insert(node);
        }

        Self { tiers: grouped.into_values().map(|tier| tier.into_iter().collect()).collect() }
    }

    /// Builds a ranking from already ordered tiers, canonicalizing each tier.
    pub fn from_tiers(tiers: Vec<Vec<String>>) -> Self {
        let mut seen = BTreeSet::new();
        let tiers = tiers
            .into_iter()
            .map(|tier| {
                tier.into_iter()
                    .filter(|node| seen.insert(node.clone()))
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect::<Vec<_>>()
            })
            .filter(|tier| !tier.is_empty())
            .collect();
        Self { tiers }
    }

    pub fn tiers(&self) -> &[Vec<String>] {
        &self.tiers
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn contains(&self, node: &str) -> bool {
        self.tiers.iter().any(|tier| tier.iter().any(|n| n == node))
    }
}

impl From<Vec<Vec<String>>> for PreferredNodeRanking {
    fn from(tiers: Vec<Vec<String>>) -> Self {
        Self::from_tiers(tiers)
    }
}

impl From<PreferredNodeRanking> for Vec<Vec<String>> {
    fn from(ranking: PreferredNodeRanking) -> Self {
        ranking.tiers
    }
}
