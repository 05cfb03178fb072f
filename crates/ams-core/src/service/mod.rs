//! The AMS service: owns every cache behind one lock.
//!
//! Each operation takes the lock, mutates [`AmsState`] and collects an
//! [`Outcome`]. The outcome's store writes are handed to the [`StoreWriter`]
//! before the lock is released, so the store sees them in lock order. Its
//! notifications are queued after release.

mod lifecycle;
mod notifications;
mod registrations;
mod subscriptions;

use std::collections::BTreeMap;
use std::sync::Arc;

use ams_types::{AmsConfig, PreferredNodeRanking, RegistrationInfo, Subscription, TrackedDevice};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::error::CoreResult;
use crate::queue::{DeliveryStats, NotificationQueue};
use crate::resolver::{PreferredNodeResolver, RankingMap};
use crate::state::{AmsState, Outcome};
use crate::store::{KvStore, StoreKeys, StoreWriter};

/// Cheaply cloneable handle shared by the HTTP layer, the event loop and the scheduler.
#[derive(Clone)]
pub struct AmsService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    config: AmsConfig,
    keys: StoreKeys,
    resolver: PreferredNodeResolver,
    state: Mutex<AmsState>,
    store: Arc<dyn KvStore>,
    writer: StoreWriter,
    queue: NotificationQueue,
}

/// Entries loaded by [`AmsService::restore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub registrations: usize,
    pub tracked_devices: usize,
    pub subscriptions: usize,
}

impl AmsService {
    /// Must be called inside a Tokio runtime: the store writer task is spawned here.
    pub fn new(config: AmsConfig, store: Arc<dyn KvStore>, queue: NotificationQueue) -> Self {
        let writer = StoreWriter::start(Arc::clone(&store));
        let keys = StoreKeys::new(config.key_root());
        let resolver = PreferredNodeResolver::new(config.zone_node_map.clone());
        info!(
            base_path = %config.base_path(),
            static_mode = resolver.is_static(),
            locality = ?config.locality,
            "AMS service created"
        );
        Self {
            inner: Arc::new(ServiceInner {
                config,
                keys,
                resolver,
                state: Mutex::new(AmsState::default()),
                store,
                writer,
                queue,
            }),
        }
    }

    pub fn config(&self) -> &AmsConfig {
        &self.inner.config
    }

    pub fn delivery_stats(&self) -> DeliveryStats {
        self.inner.queue.stats()
    }

    pub async fn rankings(&self) -> RankingMap {
        self.inner.state.lock().await.rankings.clone()
    }

    pub async fn device_locations(&self) -> BTreeMap<String, PreferredNodeRanking> {
        self.inner.state.lock().await.device_locations.clone()
    }

    pub async fn tracked_devices(&self) -> Vec<TrackedDevice> {
        self.inner.state.lock().await.tracked.values().cloned().collect()
    }

    /// Waits until every store write submitted so far has been applied.
    pub async fn sync_store(&self) {
        self.inner.writer.sync().await;
    }

    /// Submits the outcome's writes, releases the lock, then queues notifications
    /// and waits for the writes to land.
    async fn finish(&self, state: MutexGuard<'_, AmsState>, outcome: Outcome) {
        let Outcome { notifications, writes } = outcome;
        self.inner.writer.submit(writes);
        drop(state);

        for notification in notifications {
            self.inner.queue.enqueue(notification);
        }
        self.inner.writer.sync().await;
    }

    /// Reloads registrations, tracked devices and subscriptions from the store.
    pub async fn restore(&self) -> CoreResult<RestoreSummary> {
        self.inner.writer.sync().await;
        let keys = &self.inner.keys;
        let store = self.inner.store.as_ref();

        let services = store.scan_prefix(&keys.services_prefix()).await?;
        let tracked = store.scan_prefix(&keys.tracked_prefix()).await?;
        let subscriptions = store.scan_prefix(&keys.subscriptions_prefix()).await?;

        let mut summary = RestoreSummary::default();
        let mut state = self.inner.state.lock().await;

        for (key, value) in services {
            match serde_json::from_value::<RegistrationInfo>(value) {
                Ok(registration) => {
                    if let Ok(id) = registration.app_mobility_service_id.parse::<u64>() {
                        state.next_service_id = state.next_service_id.max(id + 1);
                    }
                    state
                        .registrations
                        .insert(registration.app_mobility_service_id.clone(), registration);
                    summary.registrations += 1;
                }
                Err(e) => warn!(key = %key, "Skipping unreadable registration: {}", e),
            }
        }

        for (key, value) in tracked {
            match serde_json::from_value::<TrackedDevice>(value) {
                Ok(device) => {
                    let tracked_key =
                        (device.mobility_service_id.clone(), device.address().to_string());
                    state.tracked.insert(tracked_key, device);
                    summary.tracked_devices += 1;
                }
                Err(e) => warn!(key = %key, "Skipping unreadable tracked device: {}", e),
            }
        }

        let prefix = keys.subscriptions_prefix();
        for (key, value) in subscriptions {
            let id = key.strip_prefix(&prefix).and_then(|id| id.parse::<u64>().ok());
            match (id, serde_json::from_value::<Subscription>(value)) {
                (Some(id), Ok(subscription)) => {
                    state.subscriptions.restore(id, subscription);
                    summary.subscriptions += 1;
                }
                (None, _) => warn!(key = %key, "Skipping subscription with invalid id"),
                (_, Err(e)) => warn!(key = %key, "Skipping unreadable subscription: {}", e),
            }
        }

        info!(
            registrations = summary.registrations,
            tracked_devices = summary.tracked_devices,
            subscriptions = summary.subscriptions,
            "State restored"
        );
        Ok(summary)
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
