// libs/booking-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use availability_cell::models::{AvailabilityError, TimeSlot};
use shared_models::AppError;

// ==============================================================================
// CORE BOOKING MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub status: BookingStatus,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub service_address: String,
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn window(&self) -> TimeSlot {
        TimeSlot::new(self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    Declined,
}

impl BookingStatus {
    /// Active bookings are the only ones that occupy provider time;
    /// cancelled/declined permanently free their window.
    pub fn is_active(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled | BookingStatus::Declined)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::Declined
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::InProgress => write!(f, "in_progress"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
            BookingStatus::Declined => write!(f, "declined"),
        }
    }
}

/// Already-authenticated principal attempting a status transition. The
/// identity provider vouches for the id; this cell only checks role and
/// ownership against the booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: ActorRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Customer,
    Provider,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub service_address: String,
    pub total_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub actor_id: Uuid,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BookingError {
    #[error("Booking not found")]
    NotFound,

    #[error("Requested date {0} is in the past")]
    InvalidDate(NaiveDate),

    #[error("Booking end time must be after its start time")]
    InvalidTimeRange,

    #[error("Requested window is outside the provider's availability")]
    OutsideAvailability,

    #[error("That time is no longer available")]
    SlotAlreadyBooked,

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error(transparent)]
    Availability(#[from] AvailabilityError),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match &err {
            BookingError::NotFound => AppError::NotFound(err.to_string()),
            BookingError::InvalidDate(_) | BookingError::InvalidTimeRange => {
                AppError::Validation(err.to_string())
            }
            BookingError::OutsideAvailability | BookingError::SlotAlreadyBooked => {
                AppError::Conflict(err.to_string())
            }
            BookingError::InvalidStatusTransition { .. } => AppError::Forbidden(err.to_string()),
            BookingError::Availability(inner) => inner.clone().into(),
        }
    }
}
