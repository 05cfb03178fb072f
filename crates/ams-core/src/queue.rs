//! Notification delivery queue.
//!
//! Producers enqueue without blocking; a single loop drains the channel and
//! spawns one delivery task per job, bounded by a semaphore. Jobs that find the
//! queue full are dropped and counted. Deliveries are never retried.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ams_types::models::NotificationConfig;
use serde::Serialize;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

use crate::error::CoreResult;

/// One notification addressed to one subscriber callback.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundNotification {
    pub subscription_id: String,
    pub callback: String,
    pub notification_type: String,
    pub body: serde_json::Value,
}

impl OutboundNotification {
    /// Serializes `payload`; a payload that fails to serialize is logged and skipped.
    pub fn new<T: Serialize>(
        subscription_id: impl Into<String>,
        callback: impl Into<String>,
        notification_type: &str,
        payload: &T,
    ) -> Option<Self> {
        match serde_json::to_value(payload) {
            Ok(body) => Some(Self {
                subscription_id: subscription_id.into(),
                callback: callback.into(),
                notification_type: notification_type.to_string(),
                body,
            }),
            Err(e) => {
                warn!(notification_type, "Failed to serialize notification: {}", e);
                None
            }
        }
    }
}

/// Snapshot of delivery counters.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct DeliveryStats {
    pub queued: u64,
    pub delivered: u64,
    pub failed: u64,
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    queued: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> DeliveryStats {
        DeliveryStats {
            queued: self.queued.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Cloneable handle to the delivery worker.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    tx: mpsc::Sender<OutboundNotification>,
    counters: Arc<Counters>,
}

impl NotificationQueue {
    /// Builds the HTTP client and spawns the delivery loop on the current runtime.
    pub fn start(config: &NotificationConfig) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let counters = Arc::new(Counters::default());
        let semaphore = Arc::new(Semaphore::new(config.max_in_flight.max(1)));

        tokio::spawn(delivery_loop(rx, client, semaphore, Arc::clone(&counters)));

        Ok(Self { tx, counters })
    }

    /// Queues a notification. Returns false when it was dropped.
    pub fn enqueue(&self, notification: OutboundNotification) -> bool {
        match self.tx.try_send(notification) {
            Ok(()) => {
                self.counters.queued.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(mpsc::error::TrySendError::Full(job)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(
                    subscription_id = %job.subscription_id,
                    callback = %job.callback,
                    "Notification queue full, dropping {}",
                    job.notification_type
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(subscription_id = %job.subscription_id, "Notification worker stopped");
                false
            }
        }
    }

    pub fn stats(&self) -> DeliveryStats {
        self.counters.snapshot()
    }
}

async fn delivery_loop(
    mut rx: mpsc::Receiver<OutboundNotification>,
    client: reqwest::Client,
    semaphore: Arc<Semaphore>,
    counters: Arc<Counters>,
) {
    while let Some(job) = rx.recv().await {
        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            break;
        };
        let client = client.clone();
        let counters = Arc::clone(&counters);
        tokio::spawn(async move {
            let _permit = permit;
            deliver(&client, job, &counters).await;
        });
    }
    debug!("Notification delivery loop stopped");
}

async fn deliver(client: &reqwest::Client, job: OutboundNotification, counters: &Counters) {
    let result = client.post(&job.callback).json(&job.body).send().await;
    match result {
        Ok(resp) if resp.status().is_success() => {
            counters.delivered.fetch_add(1, Ordering::Relaxed);
            debug!(
                subscription_id = %job.subscription_id,
                status = resp.status().as_u16(),
                "{} delivered",
                job.notification_type
            );
        }
        Ok(resp) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            warn!(
                subscription_id = %job.subscription_id,
                callback = %job.callback,
                status = resp.status().as_u16(),
                "{} rejected by subscriber",
                job.notification_type
            );
        }
        Err(e) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            warn!(
                subscription_id = %job.subscription_id,
                callback = %job.callback,
                "{} delivery failed: {}",
                job.notification_type,
                e
            );
        }
    }
}
