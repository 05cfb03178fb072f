//! Mutable service state guarded by the service lock.

use std::collections::{BTreeMap, BTreeSet};

use ams_types::{ApplicationInstance, PreferredNodeRanking, RegistrationInfo, TrackedDevice};
use serde::Serialize;
use tracing::warn;

use crate::queue::OutboundNotification;
use crate::resolver::RankingMap;
use crate::store::StoreWrite;
use crate::subscriptions::SubscriptionRegistry;

/// `(service id, device address)`.
pub type TrackedKey = (String, String);

/// Every cache the service owns.
#[derive(Debug, Clone)]
pub struct AmsState {
    pub registrations: BTreeMap<String, RegistrationInfo>,
    pub tracked: BTreeMap<TrackedKey, TrackedDevice>,
    /// Current ranking per device address.
    pub device_locations: BTreeMap<String, PreferredNodeRanking>,
    /// Current ranking per attachment point.
    pub rankings: RankingMap,
    /// Application instances keyed by id.
    pub apps: BTreeMap<String, ApplicationInstance>,
    pub subscriptions: SubscriptionRegistry,
    pub next_service_id: u64,
}

impl Default for AmsState {
    fn default() -> Self {
        Self {
            registrations: BTreeMap::new(),
            tracked: BTreeMap::new(),
            device_locations: BTreeMap::new(),
            rankings: RankingMap::new(),
            apps: BTreeMap::new(),
            subscriptions: SubscriptionRegistry::new(),
            next_service_id: 1,
        }
    }
}

impl AmsState {
    pub fn allocate_service_id(&mut self) -> String {
        let id = self.next_service_id;
        self.next_service_id += 1;
        id.to_string()
    }

    /// Logical name of a cached application instance.
    pub fn app_name_of(&self, app_instance_id: &str) -> Option<&str> {
        self.apps.get(app_instance_id).map(|app| app.name.as_str())
    }

    /// Cached instances sharing `name`, in id order.
    pub fn instances_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a ApplicationInstance> + 'a {
        self.apps.values().filter(move |app| app.name == name)
    }

    /// Logical application a tracked device is tracked for, via its registration consumer.
    pub fn app_name_of_device(&self, device: &TrackedDevice) -> Option<&str> {
        self.app_name_of(&device.consumer_app_instance_id)
    }

    /// Names of every application with at least one tracked device.
    pub fn tracked_app_names(&self) -> BTreeSet<String> {
        self.tracked
            .values()
            .filter_map(|device| self.app_name_of_device(device))
            .map(str::to_string)
            .collect()
    }

    /// Resets everything, including id counters.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Side effects produced under the lock and applied after it is released.
#[derive(Debug, Default)]
pub struct Outcome {
    pub notifications: Vec<OutboundNotification>,
    pub writes: Vec<StoreWrite>,
}

impl Outcome {
    pub fn put<T: Serialize>(&mut self, key: String, value: &T) {
        match StoreWrite::put(key, value) {
            Ok(write) => self.writes.push(write),
            Err(e) => warn!("Failed to encode store entry: {}", e),
        }
    }

    pub fn delete(&mut self, key: String) {
        self.writes.push(StoreWrite::delete(key));
    }

    pub fn notify(&mut self, notifications: impl IntoIterator<Item = OutboundNotification>) {
        self.notifications.extend(notifications);
    }

    pub fn merge(&mut self, other: Self) {
        self.notifications.extend(other.notifications);
        self.writes.extend(other.writes);
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty() && self.writes.is_empty()
    }
}
