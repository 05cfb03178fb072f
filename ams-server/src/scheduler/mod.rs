//! Background Schedulers
//!
//! ## Subscription Expiry
//! Periodically sends expiry notifications for subscriptions whose
//! `expiryDeadline` has passed and deletes them.

use std::time::Duration;

use ams_core::AmsService;
use ams_types::TimeStamp;
use tokio::time::{interval, MissedTickBehavior};

pub fn start_subscription_expiry(service: AmsService, period: Duration) {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let expired = service.expire_subscriptions(TimeStamp::now()).await;
            if expired > 0 {
                tracing::debug!("[Scheduler] Expired {} subscriptions", expired);
            }
        }
    });
}
