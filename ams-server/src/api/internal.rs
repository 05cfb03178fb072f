//! Internal endpoints: platform event ingress and state introspection.

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;

use ams_core::{AmsEvent, DeliveryStats, RankingMap};
use ams_types::{PreferredNodeRanking, TrackedDevice};

use super::problem::{ApiResult, ProblemDetails};
use crate::state::AppState;

/// Queues a scenario or application event for the event loop.
pub async fn post_event(
    State(state): State<AppState>,
    body: Result<Json<AmsEvent>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(event) = body?;
    state
        .publish(event)
        .map_err(|e| ProblemDetails::new(StatusCode::SERVICE_UNAVAILABLE, e.to_string()))?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn get_rankings(State(state): State<AppState>) -> Json<RankingMap> {
    Json(state.service().rankings().await)
}

pub async fn get_device_locations(
    State(state): State<AppState>,
) -> Json<BTreeMap<String, PreferredNodeRanking>> {
    Json(state.service().device_locations().await)
}

pub async fn get_tracked_devices(State(state): State<AppState>) -> Json<Vec<TrackedDevice>> {
    Json(state.service().tracked_devices().await)
}

pub async fn get_notification_stats(State(state): State<AppState>) -> Json<DeliveryStats> {
    Json(state.service().delivery_stats())
}
