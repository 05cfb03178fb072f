//! App mobility service registration handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::Value;

use ams_types::{RegistrationError, RegistrationInfo};

use super::problem::{ApiResult, ProblemDetails};
use crate::state::AppState;

fn decode(body: Result<Json<Value>, JsonRejection>) -> ApiResult<RegistrationInfo> {
    let Json(value) = body?;
    serde_json::from_value(value).map_err(|e| {
        ProblemDetails::from(ams_types::AmsError::from(RegistrationError::Malformed {
            message: e.to_string(),
        }))
    })
}

pub async fn list_registrations(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RegistrationInfo>>> {
    Ok(Json(state.service().list_registrations().await?))
}

pub async fn create_registration(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegistrationInfo>)> {
    let registration = decode(body)?;
    let created = state.service().create_registration(registration).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_registration(
    State(state): State<AppState>,
    Path(service_id): Path<String>,
) -> ApiResult<Json<RegistrationInfo>> {
    Ok(Json(state.service().get_registration(&service_id).await?))
}

pub async fn replace_registration(
    State(state): State<AppState>,
    Path(service_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<RegistrationInfo>> {
    let registration = decode(body)?;
    Ok(Json(state.service().replace_registration(&service_id, registration).await?))
}

/// Serves both `DELETE /app_mobility_services/{id}` and `POST .../deregister_task`.
pub async fn delete_registration(
    State(state): State<AppState>,
    Path(service_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.service().delete_registration(&service_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
