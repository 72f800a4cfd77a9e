use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers;
use crate::services::BookingService;

pub fn booking_routes(service: Arc<BookingService>) -> Router {
    Router::new()
        // Advisory read path
        .route(
            "/providers/{provider_id}/available-slots",
            get(handlers::get_available_slots),
        )
        // Booking ledger
        .route("/bookings", post(handlers::create_booking))
        .route("/bookings/{booking_id}", get(handlers::get_booking))
        .route(
            "/providers/{provider_id}/bookings",
            get(handlers::list_provider_bookings),
        )
        .route(
            "/customers/{customer_id}/bookings",
            get(handlers::list_customer_bookings),
        )
        // Status transitions
        .route("/bookings/{booking_id}/confirm", patch(handlers::confirm_booking))
        .route("/bookings/{booking_id}/decline", patch(handlers::decline_booking))
        .route("/bookings/{booking_id}/start", patch(handlers::start_booking))
        .route("/bookings/{booking_id}/complete", patch(handlers::complete_booking))
        .route("/bookings/{booking_id}/cancel", patch(handlers::cancel_booking))
        .with_state(service)
}
