use ams_types::models::TriggerNotification;
use ams_types::TimeStamp;
use tracing::{debug, info};

use super::AmsService;
use crate::dispatcher;
use crate::state::Outcome;

impl AmsService {
    /// Runs the mobility procedure fan-out for a manual trigger.
    ///
    /// Only devices explicitly tracked for the instance (or, failing that, for
    /// the destination MEP) with mobility allowed are announced. An entry made by
    /// the instance takes precedence over the MEP entry. Returns the number of
    /// notifications queued.
    pub async fn handle_trigger(&self, trigger: &TriggerNotification) -> usize {
        let address = trigger.associate_id.value.as_str();
        let state = self.inner.state.lock().await;

        let app_entry = state.tracked.values().find(|device| {
            device.address() == address && device.consumer_app_instance_id == trigger.app_instance_id
        });
        let entry = app_entry.or_else(|| {
            let mep = trigger.destination_mep.as_deref().filter(|m| !m.is_empty())?;
            state
                .tracked
                .values()
                .find(|device| device.address() == address && device.consumer_mep_id == mep)
        });

        let allowed = entry.is_some_and(|device| device.allows_mobility());
        if !allowed {
            debug!(
                app_instance_id = %trigger.app_instance_id,
                address = %address,
                "Trigger ignored, device not tracked with mobility allowed"
            );
            return 0;
        }

        let notifications = dispatcher::mobility_procedure(
            &state.subscriptions,
            &trigger.app_instance_id,
            &trigger.app_instance_id,
            &trigger.associate_id,
        );

        let count = notifications.len();
        info!(app_instance_id = %trigger.app_instance_id, address = %address, count, "Manual trigger");
        let mut outcome = Outcome::default();
        outcome.notify(notifications);
        self.finish(state, outcome).await;
        count
    }

    /// Sends expiry notices for and deletes every subscription past its deadline.
    pub async fn expire_subscriptions(&self, now: TimeStamp) -> usize {
        let mut state = self.inner.state.lock().await;
        let expired = state.subscriptions.take_expired(&now);
        if expired.is_empty() {
            return 0;
        }

        let mut outcome = Outcome::default();
        for (id, subscription) in &expired {
            info!(subscription_id = id, "Subscription expired");
            outcome.notify(dispatcher::expiry(*id, subscription));
            outcome.delete(self.inner.keys.subscription(&id.to_string()));
        }
        self.finish(state, outcome).await;
        expired.len()
    }
}
