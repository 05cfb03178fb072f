//! Scenario and application lifecycle handling.

use std::collections::BTreeSet;

use ams_types::ApplicationInstance;
use tracing::info;

use super::registrations::uninstall;
use super::AmsService;
use crate::dispatcher;
use crate::events::AmsEvent;
use crate::state::Outcome;
use crate::topology::{ScenarioTopology, TopologyView};
use crate::tracker;

impl AmsService {
    pub async fn handle_event(&self, event: AmsEvent) {
        match event {
            AmsEvent::ScenarioActivated { scenario } | AmsEvent::ScenarioUpdated { scenario } => {
                let topology = ScenarioTopology::new(&scenario);
                self.apply_topology(&topology).await;
            }
            AmsEvent::ScenarioTerminated => self.terminate().await,
            AmsEvent::ApplicationAdded { application }
            | AmsEvent::ApplicationUpdated { application } => {
                self.upsert_application(application).await;
            }
            AmsEvent::ApplicationRemoved { app_instance_id } => {
                self.remove_application(&app_instance_id).await;
            }
        }
    }

    /// Refreshes rankings, stores every device's new ranking, then reconciles each
    /// tracked application once against the complete picture.
    pub async fn apply_topology(&self, topology: &dyn TopologyView) {
        let config = &self.inner.config;
        let keys = &self.inner.keys;
        let rankings = self.inner.resolver.refresh_rankings(topology);

        let mut state = self.inner.state.lock().await;
        let mut outcome = Outcome::default();
        state.rankings = rankings;

        let devices = topology.devices();
        let present: BTreeSet<&str> = devices.iter().map(|d| d.address.as_str()).collect();

        for device in &devices {
            let ranking = if !device.connected || !config.in_locality(&device.zone) {
                None
            } else {
                Some(state.rankings.get(&device.attachment_point).cloned().unwrap_or_default())
            };
            tracker::set_device_location(&mut state, keys, &device.address, ranking, &mut outcome);
        }

        let departed: Vec<String> = state
            .device_locations
            .keys()
            .filter(|address| !present.contains(address.as_str()))
            .cloned()
            .collect();
        for address in departed {
            tracker::set_device_location(&mut state, keys, &address, None, &mut outcome);
        }

        for name in state.tracked_app_names() {
            outcome.merge(tracker::reconcile_ownership(&mut state, keys, &name));
        }

        info!(
            attachment_points = state.rankings.len(),
            devices = devices.len(),
            notifications = outcome.notifications.len(),
            "Topology applied"
        );
        self.finish(state, outcome).await;
    }

    /// Drops all state and flushes this instance's persisted keys.
    async fn terminate(&self) {
        let mut state = self.inner.state.lock().await;
        state.clear();
        self.inner.writer.flush_prefix(self.inner.keys.root());
        drop(state);

        self.inner.writer.sync().await;
        info!("Scenario terminated, state cleared");
    }

    async fn upsert_application(&self, application: ApplicationInstance) {
        let keys = &self.inner.keys;
        let mut state = self.inner.state.lock().await;
        let mut outcome = Outcome::default();

        let name = application.name.clone();
        let previous = state.apps.insert(application.id.clone(), application);
        let mut names = BTreeSet::from([name]);
        if let Some(previous) = previous {
            names.insert(previous.name);
        }

        for name in &names {
            outcome.merge(tracker::reconcile_ownership(&mut state, keys, name));
            outcome.notify(dispatcher::adjacent_apps(&state.subscriptions, &state.apps, name));
        }
        self.finish(state, outcome).await;
    }

    /// Forgets an instance and destroys every registration it made.
    async fn remove_application(&self, app_instance_id: &str) {
        let keys = &self.inner.keys;
        let mut state = self.inner.state.lock().await;
        let mut outcome = Outcome::default();

        let owned: Vec<String> = state
            .registrations
            .iter()
            .filter(|(_, registration)| registration.consumer_app_instance_id() == app_instance_id)
            .map(|(id, _)| id.clone())
            .collect();
        for service_id in &owned {
            uninstall(&mut state, keys, service_id, &mut outcome);
        }

        if let Some(removed) = state.apps.remove(app_instance_id) {
            outcome.merge(tracker::reconcile_ownership(&mut state, keys, &removed.name));
            outcome.notify(dispatcher::adjacent_apps(&state.subscriptions, &state.apps, &removed.name));
        }

        info!(
            app_instance_id = %app_instance_id,
            registrations_removed = owned.len(),
            "Application removed"
        );
        self.finish(state, outcome).await;
    }
}
