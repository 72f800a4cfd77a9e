use std::sync::Arc;

use axum::{routing::get, Router};

use availability_cell::router::availability_routes;
use availability_cell::services::ScheduleService;
use booking_cell::router::booking_routes;
use booking_cell::services::BookingService;

pub fn create_router(
    schedule: Arc<ScheduleService>,
    bookings: Arc<BookingService>,
) -> Router {
    Router::new()
        .route("/", get(|| async { "Doorstep Marketplace API is running!" }))
        .merge(availability_routes(schedule))
        .merge(booking_routes(bookings))
}
