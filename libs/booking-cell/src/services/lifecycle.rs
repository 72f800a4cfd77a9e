// libs/booking-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use crate::models::{Actor, ActorRole, Booking, BookingError, BookingStatus};

/// Booking status machine:
///
///   pending -> confirmed -> in_progress -> completed
///   pending -> declined
///   pending | confirmed -> cancelled
///
/// completed/cancelled/declined are terminal. The assigned provider
/// drives confirm/decline/start/complete; the owning customer drives
/// cancel. A wrong role, wrong owner, terminal source, or skipped state
/// all surface as `InvalidStatusTransition`.
pub struct BookingLifecycleService;

impl BookingLifecycleService {
    pub fn new() -> Self {
        Self
    }

    pub fn valid_transitions(&self, current: &BookingStatus) -> Vec<BookingStatus> {
        match current {
            BookingStatus::Pending => vec![
                BookingStatus::Confirmed,
                BookingStatus::Declined,
                BookingStatus::Cancelled,
            ],
            BookingStatus::Confirmed => vec![BookingStatus::InProgress, BookingStatus::Cancelled],
            BookingStatus::InProgress => vec![BookingStatus::Completed],
            // Terminal states
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::Declined => {
                vec![]
            }
        }
    }

    pub fn validate_transition(
        &self,
        booking: &Booking,
        new_status: &BookingStatus,
        actor: &Actor,
    ) -> Result<(), BookingError> {
        debug!(
            "Validating transition {} -> {} on booking {} by {:?} {}",
            booking.status, new_status, booking.id, actor.role, actor.id
        );

        let rejection = BookingError::InvalidStatusTransition {
            from: booking.status.clone(),
            to: new_status.clone(),
        };

        if !self.valid_transitions(&booking.status).contains(new_status) {
            warn!(
                "Invalid status transition attempted on booking {}: {} -> {}",
                booking.id, booking.status, new_status
            );
            return Err(rejection);
        }

        let authorized = match new_status {
            BookingStatus::Confirmed
            | BookingStatus::Declined
            | BookingStatus::InProgress
            | BookingStatus::Completed => {
                actor.role == ActorRole::Provider && actor.id == booking.provider_id
            }
            BookingStatus::Cancelled => {
                actor.role == ActorRole::Customer && actor.id == booking.customer_id
            }
            BookingStatus::Pending => false,
        };

        if !authorized {
            warn!(
                "Actor {} ({:?}) is not allowed to move booking {} to {}",
                actor.id, actor.role, booking.id, new_status
            );
            return Err(rejection);
        }

        Ok(())
    }
}

impl Default for BookingLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_have_no_exits() {
        let lifecycle = BookingLifecycleService::new();
        assert!(lifecycle.valid_transitions(&BookingStatus::Completed).is_empty());
        assert!(lifecycle.valid_transitions(&BookingStatus::Cancelled).is_empty());
        assert!(lifecycle.valid_transitions(&BookingStatus::Declined).is_empty());
    }

    #[test]
    fn pending_cannot_skip_to_completed() {
        let lifecycle = BookingLifecycleService::new();
        assert!(!lifecycle
            .valid_transitions(&BookingStatus::Pending)
            .contains(&BookingStatus::Completed));
    }
}
