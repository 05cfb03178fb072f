//! Builds subscriber notifications from the subscription registry.
//!
//! Matching happens here, delivery happens in [`crate::queue`].

use std::collections::BTreeMap;

use ams_types::models::{
    ExpiryNotification, ADJACENT_APP_INFO_NOTIFICATION, EXPIRY_NOTIFICATION,
    MOBILITY_PROCEDURE_NOTIFICATION,
};
use ams_types::{
    AdjacentAppInfoNotification, ApplicationInstance, AssociateId, MobilityProcedureNotification,
    Subscription,
};
use tracing::debug;

use crate::queue::OutboundNotification;
use crate::subscriptions::SubscriptionRegistry;

/// Mobility procedure notices for subscribers filtering on `source_app_id`.
///
/// The mobility status filter is stored but does not exclude: only the
/// move-out-triggered status is ever produced.
pub fn mobility_procedure(
    subscriptions: &SubscriptionRegistry,
    source_app_id: &str,
    target_app_id: &str,
    associate_id: &AssociateId,
) -> Vec<OutboundNotification> {
    subscriptions
        .mobility_procedure()
        .filter(|(_, sub)| {
            sub.filter_criteria.as_ref().is_some_and(|filter| {
                filter.app_instance_id == source_app_id && filter.matches_associate(associate_id)
            })
        })
        .filter_map(|(id, sub)| {
            debug!(
                subscription_id = id,
                source = %source_app_id,
                target = %target_app_id,
                "Mobility procedure notification"
            );
            let payload = MobilityProcedureNotification::triggered(target_app_id, associate_id.clone());
            OutboundNotification::new(
                id.to_string(),
                sub.callback_reference.clone(),
                MOBILITY_PROCEDURE_NOTIFICATION,
                &payload,
            )
        })
        .collect()
}

/// Adjacency notices for subscribers whose consumer instance is named `app_name`.
///
/// Each subscriber receives every cached instance of the name except its own.
pub fn adjacent_apps(
    subscriptions: &SubscriptionRegistry,
    apps: &BTreeMap<String, ApplicationInstance>,
    app_name: &str,
) -> Vec<OutboundNotification> {
    subscriptions
        .adjacent_app_info()
        .filter_map(|(id, sub)| {
            let consumer = sub.filter_criteria.as_ref()?.app_instance_id.as_str();
            if apps.get(consumer)?.name != app_name {
                return None;
            }
            let adjacent = apps
                .values()
                .filter(|app| app.name == app_name && app.id != consumer)
                .map(|app| app.id.clone());
            let payload = AdjacentAppInfoNotification::new(adjacent);
            debug!(
                subscription_id = id,
                app_name = %app_name,
                adjacent = payload.adjacent_app_info.len(),
                "Adjacent app info notification"
            );
            OutboundNotification::new(
                id.to_string(),
                sub.callback_reference.clone(),
                ADJACENT_APP_INFO_NOTIFICATION,
                &payload,
            )
        })
        .collect()
}

/// Expiry notice for a subscription being removed at its deadline.
pub fn expiry(id: u64, subscription: &Subscription) -> Option<OutboundNotification> {
    let deadline = subscription.expiry_deadline()?;
    let payload = ExpiryNotification::new(subscription.callback_reference(), deadline);
    OutboundNotification::new(
        id.to_string(),
        subscription.callback_reference(),
        EXPIRY_NOTIFICATION,
        &payload,
    )
}
