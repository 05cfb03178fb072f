//! Inbound MEC 011 notifications

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::Value;
use tracing::debug;

use ams_types::models::{NotificationCommon, TriggerNotification, TRIGGER_NOTIFICATION};

use super::problem::{ApiResult, ProblemDetails};
use crate::state::AppState;

/// Accepts any notification on the app termination endpoint. Only
/// `TriggerNotification` bodies have an effect; the rest are acknowledged.
pub async fn app_termination(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(body) = body?;
    let common: NotificationCommon = serde_json::from_value(body.clone())
        .map_err(|e| ProblemDetails::bad_request(e.to_string()))?;

    if common.notification_type != TRIGGER_NOTIFICATION {
        debug!(notification_type = %common.notification_type, "Notification acknowledged");
        return Ok(StatusCode::NO_CONTENT);
    }

    let trigger: TriggerNotification =
        serde_json::from_value(body).map_err(|e| ProblemDetails::bad_request(e.to_string()))?;
    state.service().handle_trigger(&trigger).await;
    Ok(StatusCode::NO_CONTENT)
}
