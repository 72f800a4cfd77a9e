// libs/availability-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::AppError;

use crate::models::{CreateOverrideRequest, CreateWeeklyRuleRequest, EffectiveAvailability};
use crate::services::ScheduleService;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

#[axum::debug_handler]
pub async fn create_weekly_rule(
    State(service): State<Arc<ScheduleService>>,
    Path(provider_id): Path<Uuid>,
    Json(request): Json<CreateWeeklyRuleRequest>,
) -> Result<Json<Value>, AppError> {
    let rule = service.upsert_weekly_rule(provider_id, request).await?;
    Ok(Json(json!(rule)))
}

#[axum::debug_handler]
pub async fn list_weekly_rules(
    State(service): State<Arc<ScheduleService>>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let rules = service.weekly_rules(provider_id).await;
    Ok(Json(json!({
        "rules": rules,
        "total": rules.len()
    })))
}

#[axum::debug_handler]
pub async fn delete_weekly_rule(
    State(service): State<Arc<ScheduleService>>,
    Path((provider_id, rule_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    service.delete_weekly_rule(provider_id, rule_id).await;
    Ok(Json(json!({ "deleted": rule_id })))
}

#[axum::debug_handler]
pub async fn create_override(
    State(service): State<Arc<ScheduleService>>,
    Path(provider_id): Path<Uuid>,
    Json(request): Json<CreateOverrideRequest>,
) -> Result<Json<Value>, AppError> {
    // The ambient clock stops at the handler boundary; the service only
    // ever sees an explicit date.
    let today = Utc::now().date_naive();
    let date_override = service.upsert_override(provider_id, request, today).await?;
    Ok(Json(json!(date_override)))
}

#[axum::debug_handler]
pub async fn list_overrides(
    State(service): State<Arc<ScheduleService>>,
    Path(provider_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let overrides = service.overrides(provider_id).await;
    Ok(Json(json!({
        "overrides": overrides,
        "total": overrides.len()
    })))
}

#[axum::debug_handler]
pub async fn delete_override(
    State(service): State<Arc<ScheduleService>>,
    Path((provider_id, override_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    service.delete_override(provider_id, override_id).await;
    Ok(Json(json!({ "deleted": override_id })))
}

#[axum::debug_handler]
pub async fn get_effective_availability(
    State(service): State<Arc<ScheduleService>>,
    Path(provider_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let availability = service
        .effective_availability(provider_id, query.date)
        .await?;

    let body = match availability {
        EffectiveAvailability::Unavailable => json!({
            "date": query.date,
            "available": false,
            "windows": []
        }),
        EffectiveAvailability::Windows(windows) => json!({
            "date": query.date,
            "available": !windows.is_empty(),
            "windows": windows
        }),
    };

    Ok(Json(body))
}
