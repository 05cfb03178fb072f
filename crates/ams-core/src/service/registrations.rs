use std::collections::{BTreeMap, BTreeSet};

use ams_types::{RegistrationError, RegistrationInfo, Result};
use tracing::info;

use super::AmsService;
use crate::state::{AmsState, Outcome};
use crate::store::StoreKeys;
use crate::tracker;

impl AmsService {
    /// Creates a registration with a fresh service id and assigns initial owners.
    pub async fn create_registration(&self, mut registration: RegistrationInfo) -> Result<RegistrationInfo> {
        registration.validate()?;

        let keys = &self.inner.keys;
        let mut state = self.inner.state.lock().await;
        let mut outcome = Outcome::default();

        let service_id = state.allocate_service_id();
        registration.app_mobility_service_id = service_id.clone();
        install(&mut state, keys, &registration, &BTreeMap::new(), &mut outcome);

        if let Some(name) = state.app_name_of(registration.consumer_app_instance_id()).map(str::to_string) {
            outcome.merge(tracker::reconcile_ownership(&mut state, keys, &name));
        }

        info!(
            service_id = %service_id,
            devices = registration.device_information.len(),
            "Registration created"
        );
        self.finish(state, outcome).await;
        Ok(registration)
    }

    /// Replaces a registration wholesale. Owners of re-declared devices are kept.
    pub async fn replace_registration(
        &self,
        service_id: &str,
        registration: RegistrationInfo,
    ) -> Result<RegistrationInfo> {
        registration.validate()?;
        if registration.app_mobility_service_id != service_id {
            return Err(RegistrationError::IdMismatch {
                path_id: service_id.to_string(),
                body_id: registration.app_mobility_service_id.clone(),
            }
            .into());
        }

        let keys = &self.inner.keys;
        let mut state = self.inner.state.lock().await;
        let Some(previous) = state.registrations.get(service_id).cloned() else {
            return Err(RegistrationError::NotFound { id: service_id.to_string() }.into());
        };

        let mut outcome = Outcome::default();
        let owners = uninstall(&mut state, keys, service_id, &mut outcome);
        install(&mut state, keys, &registration, &owners, &mut outcome);

        let names: BTreeSet<String> = [
            previous.consumer_app_instance_id(),
            registration.consumer_app_instance_id(),
        ]
        .into_iter()
        .filter_map(|id| state.app_name_of(id).map(str::to_string))
        .collect();
        for name in names {
            outcome.merge(tracker::reconcile_ownership(&mut state, keys, &name));
        }

        info!(service_id = %service_id, "Registration replaced");
        self.finish(state, outcome).await;
        Ok(registration)
    }

    pub async fn delete_registration(&self, service_id: &str) -> Result<()> {
        let keys = &self.inner.keys;
        let mut state = self.inner.state.lock().await;
        if !state.registrations.contains_key(service_id) {
            return Err(RegistrationError::NotFound { id: service_id.to_string() }.into());
        }

        let mut outcome = Outcome::default();
        uninstall(&mut state, keys, service_id, &mut outcome);

        info!(service_id = %service_id, "Registration deleted");
        self.finish(state, outcome).await;
        Ok(())
    }

    pub async fn get_registration(&self, service_id: &str) -> Result<RegistrationInfo> {
        self.inner
            .state
            .lock()
            .await
            .registrations
            .get(service_id)
            .cloned()
            .ok_or_else(|| RegistrationError::NotFound { id: service_id.to_string() }.into())
    }

    /// All registrations in service id order.
    pub async fn list_registrations(&self) -> Result<Vec<RegistrationInfo>> {
        let state = self.inner.state.lock().await;
        let mut registrations: Vec<RegistrationInfo> = state.registrations.values().cloned().collect();
        drop(state);

        if registrations.is_empty() {
            return Err(RegistrationError::NoneRegistered.into());
        }
        registrations.sort_by_key(|r| r.app_mobility_service_id.parse::<u64>().unwrap_or(u64::MAX));
        Ok(registrations)
    }
}

/// Stores a registration and its tracked devices, restoring known owners.
fn install(
    state: &mut AmsState,
    keys: &StoreKeys,
    registration: &RegistrationInfo,
    owners: &BTreeMap<String, String>,
    outcome: &mut Outcome,
) {
    let service_id = registration.app_mobility_service_id.as_str();
    for mut device in registration.tracked_devices() {
        if let Some(owner) = owners.get(device.address()) {
            device.owner_app_instance_id = owner.clone();
        }
        outcome.put(keys.tracked(service_id, device.address()), &device);
        state.tracked.insert((service_id.to_string(), device.address().to_string()), device);
    }
    outcome.put(keys.service(service_id), registration);
    state.registrations.insert(service_id.to_string(), registration.clone());
}

/// Removes a registration and its tracked devices, returning their owners by address.
pub(super) fn uninstall(
    state: &mut AmsState,
    keys: &StoreKeys,
    service_id: &str,
    outcome: &mut Outcome,
) -> BTreeMap<String, String> {
    let removed: Vec<_> = state
        .tracked
        .keys()
        .filter(|(svc, _)| svc == service_id)
        .cloned()
        .collect();

    let mut owners = BTreeMap::new();
    for key in removed {
        if let Some(device) = state.tracked.remove(&key) {
            outcome.delete(keys.tracked(&key.0, &key.1));
            if !device.is_unassigned() {
                owners.insert(key.1, device.owner_app_instance_id);
            }
        }
    }

    if state.registrations.remove(service_id).is_some() {
        outcome.delete(keys.service(service_id));
    }
    owners
}
