//! API Routes
//!
//! `router()` is the MEC 021 AMS API, nested under the configured base path.
//! `internal_router()` carries the platform event ingress and introspection.

mod internal;
mod notifications;
pub mod problem;
mod registrations;
mod subscriptions;

#[cfg(test)]
mod subscriptions_tests;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        // Registrations
        .route(
            "/app_mobility_services",
            get(registrations::list_registrations).post(registrations::create_registration),
        )
        .route(
            "/app_mobility_services/:service_id",
            get(registrations::get_registration)
                .put(registrations::replace_registration)
                .delete(registrations::delete_registration),
        )
        .route(
            "/app_mobility_services/:service_id/deregister_task",
            post(registrations::delete_registration),
        )
        // Subscriptions
        .route(
            "/subscriptions",
            get(subscriptions::list_subscriptions).post(subscriptions::create_subscription),
        )
        .route(
            "/subscriptions/:subscription_id",
            get(subscriptions::get_subscription)
                .put(subscriptions::replace_subscription)
                .delete(subscriptions::delete_subscription),
        )
        // Inbound notifications
        .route("/notifications/mec011/appTermination", post(notifications::app_termination))
}

pub fn internal_router() -> Router<AppState> {
    Router::new()
        .route("/events", post(internal::post_event))
        .route("/rankings", get(internal::get_rankings))
        .route("/device_locations", get(internal::get_device_locations))
        .route("/tracked_devices", get(internal::get_tracked_devices))
        .route("/notifications/stats", get(internal::get_notification_stats))
}
