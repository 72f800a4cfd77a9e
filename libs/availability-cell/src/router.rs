use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers;
use crate::services::ScheduleService;

pub fn availability_routes(service: Arc<ScheduleService>) -> Router {
    Router::new()
        // Weekly recurring schedule
        .route(
            "/providers/{provider_id}/weekly-rules",
            post(handlers::create_weekly_rule).get(handlers::list_weekly_rules),
        )
        .route(
            "/providers/{provider_id}/weekly-rules/{rule_id}",
            delete(handlers::delete_weekly_rule),
        )
        // Date-specific overrides (blackout / vacation / custom hours)
        .route(
            "/providers/{provider_id}/overrides",
            post(handlers::create_override).get(handlers::list_overrides),
        )
        .route(
            "/providers/{provider_id}/overrides/{override_id}",
            delete(handlers::delete_override),
        )
        // Resolved availability for one date
        .route(
            "/providers/{provider_id}/availability",
            get(handlers::get_effective_availability),
        )
        .with_state(service)
}
