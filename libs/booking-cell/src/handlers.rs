// libs/booking-cell/src/handlers.rs
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

use crate::models::{Actor, ActorRole, BookingStatus, CreateBookingRequest, TransitionRequest};
use crate::services::BookingService;

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub date: NaiveDate,
    pub duration_minutes: i64,
}

#[derive(Debug, Deserialize)]
pub struct ProviderBookingsQuery {
    pub date: Option<NaiveDate>,
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(service): State<Arc<BookingService>>,
    Path(provider_id): Path<Uuid>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Value>, AppError> {
    let today = Utc::now().date_naive();
    let slots = service
        .available_slots(provider_id, query.date, query.duration_minutes, today)
        .await?;

    Ok(Json(json!({
        "date": query.date,
        "duration_minutes": query.duration_minutes,
        "slots": slots,
        "total": slots.len()
    })))
}

#[axum::debug_handler]
pub async fn create_booking(
    State(service): State<Arc<BookingService>>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let today = Utc::now().date_naive();
    let booking = service.create_booking(request, today).await?;
    Ok(Json(json!(booking)))
}

#[axum::debug_handler]
pub async fn get_booking(
    State(service): State<Arc<BookingService>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let booking = service.get_booking(booking_id).await?;
    Ok(Json(json!(booking)))
}

#[axum::debug_handler]
pub async fn list_provider_bookings(
    State(service): State<Arc<BookingService>>,
    Path(provider_id): Path<Uuid>,
    Query(query): Query<ProviderBookingsQuery>,
) -> Result<Json<Value>, AppError> {
    let bookings = service.provider_bookings(provider_id, query.date).await;
    Ok(Json(json!({
        "bookings": bookings,
        "total": bookings.len()
    })))
}

#[axum::debug_handler]
pub async fn list_customer_bookings(
    State(service): State<Arc<BookingService>>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let bookings = service.customer_bookings(customer_id).await;
    Ok(Json(json!({
        "bookings": bookings,
        "total": bookings.len()
    })))
}

// Transition endpoints. The route fixes the target status and the role
// the identity layer must have authenticated; the engine still verifies
// ownership against the booking itself.

async fn transition(
    service: Arc<BookingService>,
    booking_id: Uuid,
    new_status: BookingStatus,
    actor: Actor,
) -> Result<Json<Value>, AppError> {
    let booking = service.transition(booking_id, new_status, actor).await?;
    Ok(Json(json!(booking)))
}

#[axum::debug_handler]
pub async fn confirm_booking(
    State(service): State<Arc<BookingService>>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor { id: request.actor_id, role: ActorRole::Provider };
    transition(service, booking_id, BookingStatus::Confirmed, actor).await
}

#[axum::debug_handler]
pub async fn decline_booking(
    State(service): State<Arc<BookingService>>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor { id: request.actor_id, role: ActorRole::Provider };
    transition(service, booking_id, BookingStatus::Declined, actor).await
}

#[axum::debug_handler]
pub async fn start_booking(
    State(service): State<Arc<BookingService>>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor { id: request.actor_id, role: ActorRole::Provider };
    transition(service, booking_id, BookingStatus::InProgress, actor).await
}

#[axum::debug_handler]
pub async fn complete_booking(
    State(service): State<Arc<BookingService>>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor { id: request.actor_id, role: ActorRole::Provider };
    transition(service, booking_id, BookingStatus::Completed, actor).await
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(service): State<Arc<BookingService>>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor { id: request.actor_id, role: ActorRole::Customer };
    transition(service, booking_id, BookingStatus::Cancelled, actor).await
}
