//! In-service subscription registry.

use std::collections::BTreeMap;

use ams_types::models::{
    AdjacentAppInfoSubscription, LinkType, MobilityProcedureSubscription, SubscriptionKind,
    SubscriptionLinkList, SubscriptionLinkListEntry, SubscriptionLinks,
};
use ams_types::{Subscription, SubscriptionError, TimeStamp};

/// Subscriptions of both kinds keyed by numeric id. Ids are shared across kinds.
#[derive(Debug, Clone)]
pub struct SubscriptionRegistry {
    entries: BTreeMap<u64, Subscription>,
    next_id: u64,
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self { entries: BTreeMap::new(), next_id: 1 }
    }
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, id: u64, subscription: Subscription) {
        self.entries.insert(id, subscription);
    }

    /// Inserts a persisted subscription and moves the id counter past it.
    pub fn restore(&mut self, id: u64, subscription: Subscription) {
        self.next_id = self.next_id.max(id + 1);
        self.entries.insert(id, subscription);
    }

    pub fn get(&self, id: &str) -> Option<&Subscription> {
        id.parse::<u64>().ok().and_then(|id| self.entries.get(&id))
    }

    pub fn remove(&mut self, id: &str) -> Option<Subscription> {
        id.parse::<u64>().ok().and_then(|id| self.entries.remove(&id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_id = 1;
    }

    pub fn mobility_procedure(&self) -> impl Iterator<Item = (u64, &MobilityProcedureSubscription)> {
        self.entries.iter().filter_map(|(id, sub)| match sub {
            Subscription::MobilityProcedure(mp) => Some((*id, mp)),
            Subscription::AdjacentAppInfo(_) => None,
        })
    }

    pub fn adjacent_app_info(&self) -> impl Iterator<Item = (u64, &AdjacentAppInfoSubscription)> {
        self.entries.iter().filter_map(|(id, sub)| match sub {
            Subscription::AdjacentAppInfo(adj) => Some((*id, adj)),
            Subscription::MobilityProcedure(_) => None,
        })
    }

    /// Removes and returns every subscription whose deadline has passed.
    pub fn take_expired(&mut self, now: &TimeStamp) -> Vec<(u64, Subscription)> {
        let expired: Vec<u64> = self
            .entries
            .iter()
            .filter(|(_, sub)| sub.expiry_deadline().is_some_and(|deadline| deadline.has_passed(now)))
            .map(|(id, _)| *id)
            .collect();
        expired
            .into_iter()
            .filter_map(|id| self.entries.remove(&id).map(|sub| (id, sub)))
            .collect()
    }

    /// Link list for the list endpoint, optionally restricted to one kind.
    pub fn link_list(&self, self_href: String, kind: Option<SubscriptionKind>) -> SubscriptionLinkList {
        let subscription = self
            .entries
            .values()
            .filter(|sub| kind.map_or(true, |k| sub.kind() == k))
            .filter_map(|sub| {
                sub.links().map(|links| SubscriptionLinkListEntry {
                    href: links.self_link.href.clone(),
                    subscription_type: sub.kind(),
                })
            })
            .collect();
        SubscriptionLinkList {
            links: SubscriptionLinks { self_link: LinkType::new(self_href) },
            subscription,
        }
    }
}

/// Validates list query parameters: only `subscriptionType` with a known value.
pub fn parse_list_query(
    params: &[(String, String)],
) -> Result<Option<SubscriptionKind>, SubscriptionError> {
    let mut kind = None;
    for (name, value) in params {
        if name != "subscriptionType" {
            return Err(SubscriptionError::InvalidQuery { param: name.clone() });
        }
        kind = Some(
            SubscriptionKind::from_query(value)
                .ok_or_else(|| SubscriptionError::InvalidQuery { param: name.clone() })?,
        );
    }
    Ok(kind)
}
