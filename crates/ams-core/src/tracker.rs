//! Device context tracker.
//!
//! Decides which application instance owns each tracked device's context.
//! Every function here runs under the service lock and only mutates the
//! in-memory [`AmsState`]; store writes and notifications are returned in an
//! [`Outcome`] for the caller to apply once the lock is released.
//!
//! Per device the owner moves `unassigned -> owned(a) -> owned(b) ...`:
//!
//! - devices whose service level forbids mobility are never touched
//! - the first assignment is silent
//! - an owner still present in the candidate set is kept
//! - a device whose context transfer already completed is kept
//! - otherwise ownership moves to the first candidate, and subscribers of the
//!   previous owner are notified only if the device was registered by it

use std::collections::BTreeSet;

use ams_types::PreferredNodeRanking;
use tracing::{debug, info, warn};

use crate::dispatcher;
use crate::state::{AmsState, Outcome, TrackedKey};
use crate::store::StoreKeys;

/// Stores a device's new ranking and reconciles the applications tracking it.
///
/// `None` means the device left: its cached ranking is dropped and nothing else
/// happens. An unchanged ranking is a no-op.
pub fn update_device_location(
    state: &mut AmsState,
    keys: &StoreKeys,
    address: &str,
    ranking: Option<PreferredNodeRanking>,
) -> Outcome {
    let mut outcome = Outcome::default();
    let departed = ranking.is_none();
    if !set_device_location(state, keys, address, ranking, &mut outcome) || departed {
        return outcome;
    }

    let impacted: BTreeSet<String> = state
        .tracked
        .values()
        .filter(|device| device.address() == address)
        .filter_map(|device| state.app_name_of_device(device))
        .map(str::to_string)
        .collect();

    for app_name in impacted {
        outcome.merge(reconcile_ownership(state, keys, &app_name));
    }
    outcome
}

/// Stores or clears a device's ranking without reconciling anything.
///
/// Returns whether the cached ranking changed. Used directly when many devices
/// move at once and reconciliation runs after all of them are stored.
pub fn set_device_location(
    state: &mut AmsState,
    keys: &StoreKeys,
    address: &str,
    ranking: Option<PreferredNodeRanking>,
    outcome: &mut Outcome,
) -> bool {
    let Some(ranking) = ranking else {
        if state.device_locations.remove(address).is_none() {
            return false;
        }
        debug!(address = %address, "Device location cleared");
        outcome.delete(keys.device_location(address));
        return true;
    };

    if state.device_locations.get(address) == Some(&ranking) {
        return false;
    }
    outcome.put(keys.device_location(address), &ranking);
    state.device_locations.insert(address.to_string(), ranking);
    true
}

/// Re-evaluates the owner of every device tracked for `app_name`.
pub fn reconcile_ownership(state: &mut AmsState, keys: &StoreKeys, app_name: &str) -> Outcome {
    let mut outcome = Outcome::default();

    let targets: Vec<TrackedKey> = state
        .tracked
        .iter()
        .filter(|(_, device)| state.app_name_of_device(device) == Some(app_name))
        .map(|(key, _)| key.clone())
        .collect();

    for key in targets {
        let Some(device) = state.tracked.get(&key) else {
            continue;
        };
        if !device.allows_mobility() {
            debug!(service_id = %key.0, address = %key.1, "Mobility not allowed, skipping");
            continue;
        }

        let Some(candidates) = resolve_target_instances(state, app_name, device.address()) else {
            warn!(
                service_id = %key.0,
                address = %key.1,
                app_name = %app_name,
                "No target instance found for device"
            );
            continue;
        };
        let Some(target) = candidates.first().cloned() else {
            continue;
        };

        let previous = device.owner_app_instance_id.clone();
        if !previous.is_empty()
            && (candidates.contains(&previous) || device.transfer_completed())
        {
            continue;
        }

        let Some(device) = state.tracked.get_mut(&key) else {
            continue;
        };
        device.owner_app_instance_id = target.clone();
        outcome.put(keys.tracked(&key.0, &key.1), &*device);

        if previous.is_empty() {
            info!(service_id = %key.0, address = %key.1, owner = %target, "Initial context owner assigned");
            continue;
        }

        info!(
            service_id = %key.0,
            address = %key.1,
            from = %previous,
            to = %target,
            "Context ownership transferred"
        );
        if device.consumer_app_instance_id == previous {
            let associate_id = device.associate_id.clone();
            outcome.notify(dispatcher::mobility_procedure(
                &state.subscriptions,
                &previous,
                &target,
                &associate_id,
            ));
        }
    }
    outcome
}

/// Instances of `app_name` hosted on the closest tier that hosts any, sorted by id.
pub fn resolve_target_instances(
    state: &AmsState,
    app_name: &str,
    address: &str,
) -> Option<Vec<String>> {
    let ranking = state.device_locations.get(address)?;
    ranking.tiers().iter().find_map(|tier| {
        let mut ids: Vec<String> = state
            .instances_named(app_name)
            .filter(|app| tier.contains(&app.node_name))
            .map(|app| app.id.clone())
            .collect();
        if ids.is_empty() {
            return None;
        }
        ids.sort();
        Some(ids)
    })
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
