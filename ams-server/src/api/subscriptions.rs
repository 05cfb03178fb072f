//! Mobility procedure and adjacent app info subscription handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::Value;

use ams_core::subscriptions::parse_list_query;
use ams_types::models::SubscriptionLinkList;
use ams_types::{AmsError, Subscription};

use super::problem::ApiResult;
use crate::state::AppState;

pub async fn list_subscriptions(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<SubscriptionLinkList>> {
    let kind = parse_list_query(&params).map_err(AmsError::from)?;
    Ok(Json(state.service().list_subscriptions(kind).await))
}

pub async fn create_subscription(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Subscription>)> {
    let Json(body) = body?;
    let created = state.service().create_subscription(body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_subscription(
    State(state): State<AppState>,
    Path(subscription_id): Path<String>,
) -> ApiResult<Json<Subscription>> {
    Ok(Json(state.service().get_subscription(&subscription_id).await?))
}

pub async fn replace_subscription(
    State(state): State<AppState>,
    Path(subscription_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Subscription>> {
    let Json(body) = body?;
    Ok(Json(state.service().replace_subscription(&subscription_id, body).await?))
}

pub async fn delete_subscription(
    State(state): State<AppState>,
    Path(subscription_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.service().delete_subscription(&subscription_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
