// libs/booking-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use availability_cell::models::{AvailabilityError, EffectiveAvailability, TimeSlot};
use availability_cell::services::overlap::MIN_RULE_MINUTES;
use availability_cell::services::slots::candidate_slots;
use availability_cell::services::ScheduleService;

use crate::models::{Actor, Booking, BookingError, BookingStatus, CreateBookingRequest};
use crate::services::lifecycle::BookingLifecycleService;
use crate::store::BookingLedger;

pub struct BookingService {
    schedule: Arc<ScheduleService>,
    ledger: Arc<BookingLedger>,
    lifecycle: BookingLifecycleService,
}

impl BookingService {
    pub fn new(schedule: Arc<ScheduleService>) -> Self {
        Self {
            schedule,
            ledger: Arc::new(BookingLedger::new()),
            lifecycle: BookingLifecycleService::new(),
        }
    }

    /// Advisory read path: the bookable slots for one provider-date.
    /// The result can go stale the moment it is rendered; the write path
    /// re-runs the equivalent checks transactionally.
    pub async fn available_slots(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        duration_minutes: i64,
        today: NaiveDate,
    ) -> Result<Vec<TimeSlot>, BookingError> {
        debug!(
            "Computing available slots for provider {} on {} ({} min)",
            provider_id, date, duration_minutes
        );

        if date < today {
            return Err(BookingError::Availability(AvailabilityError::InvalidDate(
                date,
            )));
        }
        if duration_minutes < MIN_RULE_MINUTES {
            return Err(BookingError::Availability(
                AvailabilityError::InvalidDuration {
                    min: MIN_RULE_MINUTES,
                    got: duration_minutes,
                },
            ));
        }

        let windows = match self.schedule.effective_availability(provider_id, date).await? {
            // "No availability" is a normal, representable outcome.
            EffectiveAvailability::Unavailable => return Ok(Vec::new()),
            EffectiveAvailability::Windows(windows) => windows,
        };

        let busy = self.ledger.active_windows(provider_id, date).await;
        let slots = candidate_slots(&windows, duration_minutes, &busy);

        debug!("Found {} available slots", slots.len());
        Ok(slots)
    }

    /// Write path. Re-derives effective availability and re-checks
    /// overlap atomically with the insert, so a stale slot cache or a
    /// racing customer can never produce a double booking.
    pub async fn create_booking(
        &self,
        request: CreateBookingRequest,
        today: NaiveDate,
    ) -> Result<Booking, BookingError> {
        info!(
            "Booking request from customer {} for provider {} on {} {}-{}",
            request.customer_id, request.provider_id, request.date,
            request.start_time, request.end_time
        );

        if request.end_time <= request.start_time {
            return Err(BookingError::InvalidTimeRange);
        }
        if request.date < today {
            return Err(BookingError::InvalidDate(request.date));
        }

        let windows = match self
            .schedule
            .effective_availability(request.provider_id, request.date)
            .await
        {
            Ok(availability) => availability.windows().to_vec(),
            // A provider with no schedule state has no availability to
            // be inside of.
            Err(AvailabilityError::UnknownProvider(_)) => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            customer_id: request.customer_id,
            provider_id: request.provider_id,
            service_id: request.service_id,
            status: BookingStatus::Pending,
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            service_address: request.service_address,
            total_price: request.total_price,
            created_at: now,
            updated_at: now,
        };

        let booking = match self.ledger.insert_checked(booking, &windows).await {
            Ok(booking) => booking,
            Err(err) => {
                warn!(
                    "Booking rejected for provider {} on {}: {}",
                    request.provider_id, request.date, err
                );
                return Err(err);
            }
        };

        info!("Booking {} created with status pending", booking.id);
        Ok(booking)
    }

    pub async fn transition(
        &self,
        booking_id: Uuid,
        new_status: BookingStatus,
        actor: Actor,
    ) -> Result<Booking, BookingError> {
        let lifecycle = &self.lifecycle;
        let updated = self
            .ledger
            .with_booking_mut(booking_id, |booking| {
                lifecycle.validate_transition(booking, &new_status, &actor)?;
                booking.status = new_status.clone();
                booking.updated_at = Utc::now();
                Ok(booking.clone())
            })
            .await?;

        info!("Booking {} moved to {}", booking_id, updated.status);
        Ok(updated)
    }

    pub async fn get_booking(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        self.ledger.get(booking_id).await.ok_or(BookingError::NotFound)
    }

    pub async fn provider_bookings(
        &self,
        provider_id: Uuid,
        date: Option<NaiveDate>,
    ) -> Vec<Booking> {
        self.ledger.list_for_provider(provider_id, date).await
    }

    pub async fn customer_bookings(&self, customer_id: Uuid) -> Vec<Booking> {
        self.ledger.list_for_customer(customer_id).await
    }
}
