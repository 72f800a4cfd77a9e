// libs/booking-cell/src/store.rs
//
// In-memory booking ledger striped by provider id. The availability
// containment check and the overlap re-check run while the provider's
// stripe is held for writing, atomically with the insert: that lock is
// the true concurrency gate, not the advisory slot read. Bookings are
// never removed; cancellation is a status change.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use availability_cell::models::TimeSlot;
use availability_cell::services::overlap::intervals_overlap;

use crate::models::{Booking, BookingError};

#[derive(Debug, Default)]
struct ProviderLedger {
    bookings: HashMap<Uuid, Booking>,
}

#[derive(Debug, Default)]
pub struct BookingLedger {
    providers: RwLock<HashMap<Uuid, Arc<RwLock<ProviderLedger>>>>,
    /// booking id -> provider id, so transitions can address a booking
    /// by id alone while writes contend only on the owning stripe.
    index: RwLock<HashMap<Uuid, Uuid>>,
}

impl BookingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    async fn stripe(&self, provider_id: Uuid) -> Arc<RwLock<ProviderLedger>> {
        let mut providers = self.providers.write().await;
        providers
            .entry(provider_id)
            .or_insert_with(|| Arc::new(RwLock::new(ProviderLedger::default())))
            .clone()
    }

    async fn existing_stripe(&self, provider_id: Uuid) -> Option<Arc<RwLock<ProviderLedger>>> {
        self.providers.read().await.get(&provider_id).cloned()
    }

    /// Insert a booking after re-running both write gates under the
    /// provider's stripe lock: the window must lie inside one of the
    /// given availability `windows`, and must not overlap any active
    /// booking on the same date. Two racing inserts for overlapping
    /// windows serialize here and the loser gets `SlotAlreadyBooked`.
    pub async fn insert_checked(
        &self,
        booking: Booking,
        windows: &[TimeSlot],
    ) -> Result<Booking, BookingError> {
        let stripe = self.stripe(booking.provider_id).await;
        let mut ledger = stripe.write().await;

        let requested = booking.window();
        if !windows.iter().any(|window| window.contains(&requested)) {
            return Err(BookingError::OutsideAvailability);
        }

        let conflict = ledger.bookings.values().any(|existing| {
            existing.date == booking.date
                && existing.status.is_active()
                && intervals_overlap(&requested, &existing.window())
        });
        if conflict {
            return Err(BookingError::SlotAlreadyBooked);
        }

        ledger.bookings.insert(booking.id, booking.clone());
        drop(ledger);

        self.index.write().await.insert(booking.id, booking.provider_id);
        Ok(booking)
    }

    /// Windows occupied by active bookings on one provider-date.
    pub async fn active_windows(&self, provider_id: Uuid, date: NaiveDate) -> Vec<TimeSlot> {
        match self.existing_stripe(provider_id).await {
            Some(stripe) => {
                let ledger = stripe.read().await;
                let mut windows: Vec<TimeSlot> = ledger
                    .bookings
                    .values()
                    .filter(|booking| booking.date == date && booking.status.is_active())
                    .map(|booking| booking.window())
                    .collect();
                windows.sort_by(|a, b| a.start.cmp(&b.start));
                windows
            }
            None => Vec::new(),
        }
    }

    pub async fn get(&self, booking_id: Uuid) -> Option<Booking> {
        let provider_id = *self.index.read().await.get(&booking_id)?;
        let stripe = self.existing_stripe(provider_id).await?;
        let ledger = stripe.read().await;
        ledger.bookings.get(&booking_id).cloned()
    }

    /// Read-modify-write under the owning stripe's lock; `apply` decides
    /// whether the mutation is legal and the whole operation aborts on
    /// its error with nothing persisted.
    pub async fn with_booking_mut<T, F>(&self, booking_id: Uuid, apply: F) -> Result<T, BookingError>
    where
        F: FnOnce(&mut Booking) -> Result<T, BookingError>,
    {
        let provider_id = *self
            .index
            .read()
            .await
            .get(&booking_id)
            .ok_or(BookingError::NotFound)?;
        let stripe = self
            .existing_stripe(provider_id)
            .await
            .ok_or(BookingError::NotFound)?;
        let mut ledger = stripe.write().await;
        let booking = ledger
            .bookings
            .get_mut(&booking_id)
            .ok_or(BookingError::NotFound)?;
        apply(booking)
    }

    pub async fn list_for_provider(
        &self,
        provider_id: Uuid,
        date: Option<NaiveDate>,
    ) -> Vec<Booking> {
        match self.existing_stripe(provider_id).await {
            Some(stripe) => {
                let ledger = stripe.read().await;
                let mut bookings: Vec<Booking> = ledger
                    .bookings
                    .values()
                    .filter(|booking| date.map_or(true, |d| booking.date == d))
                    .cloned()
                    .collect();
                bookings.sort_by(|a, b| (a.date, a.start_time).cmp(&(b.date, b.start_time)));
                bookings
            }
            None => Vec::new(),
        }
    }

    pub async fn list_for_customer(&self, customer_id: Uuid) -> Vec<Booking> {
        let stripes: Vec<Arc<RwLock<ProviderLedger>>> =
            self.providers.read().await.values().cloned().collect();

        let mut bookings = Vec::new();
        for stripe in stripes {
            let ledger = stripe.read().await;
            bookings.extend(
                ledger
                    .bookings
                    .values()
                    .filter(|booking| booking.customer_id == customer_id)
                    .cloned(),
            );
        }
        bookings.sort_by(|a, b| (a.date, a.start_time).cmp(&(b.date, b.start_time)));
        bookings
    }
}
