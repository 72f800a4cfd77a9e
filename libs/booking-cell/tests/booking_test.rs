// libs/booking-cell/tests/booking_test.rs
//
// End-to-end engine tests: slot generation against the live ledger,
// the transactional booking gate, and the status machine.

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use availability_cell::models::{
    AvailabilityError, CreateOverrideRequest, CreateWeeklyRuleRequest, OverrideKind, TimeSlot,
};
use availability_cell::services::ScheduleService;
use availability_cell::store::ScheduleStore;
use booking_cell::models::{
    Actor, ActorRole, BookingError, BookingStatus, CreateBookingRequest,
};
use booking_cell::services::BookingService;

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn slot(start: (u32, u32), end: (u32, u32)) -> TimeSlot {
    TimeSlot::new(time(start.0, start.1), time(end.0, end.1))
}

fn today() -> NaiveDate {
    // A Monday.
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

struct TestSetup {
    schedule: Arc<ScheduleService>,
    bookings: Arc<BookingService>,
    provider: Uuid,
}

impl TestSetup {
    /// Provider with a weekly Monday 09:00-12:00 rule and no bookings.
    async fn with_monday_morning() -> Self {
        let schedule = Arc::new(ScheduleService::new(Arc::new(ScheduleStore::new())));
        let bookings = Arc::new(BookingService::new(Arc::clone(&schedule)));
        let provider = Uuid::new_v4();

        schedule
            .upsert_weekly_rule(
                provider,
                CreateWeeklyRuleRequest {
                    day_of_week: 1,
                    start_time: time(9, 0),
                    end_time: time(12, 0),
                },
            )
            .await
            .expect("seed rule should be accepted");

        Self { schedule, bookings, provider }
    }

    fn booking_request(&self, start: (u32, u32), end: (u32, u32)) -> CreateBookingRequest {
        CreateBookingRequest {
            customer_id: Uuid::new_v4(),
            provider_id: self.provider,
            service_id: Uuid::new_v4(),
            date: today(),
            start_time: time(start.0, start.1),
            end_time: time(end.0, end.1),
            service_address: "12 Elm Street".to_string(),
            total_price: 80.0,
        }
    }
}

// ==============================================================================
// SLOT GENERATION
// ==============================================================================

#[tokio::test]
async fn monday_morning_yields_five_sliding_hour_slots() {
    let setup = TestSetup::with_monday_morning().await;

    let slots = setup
        .bookings
        .available_slots(setup.provider, today(), 60, today())
        .await
        .unwrap();

    assert_eq!(
        slots,
        vec![
            slot((9, 0), (10, 0)),
            slot((9, 30), (10, 30)),
            slot((10, 0), (11, 0)),
            slot((10, 30), (11, 30)),
            slot((11, 0), (12, 0)),
        ]
    );
}

#[tokio::test]
async fn active_booking_removes_overlapping_slots() {
    let setup = TestSetup::with_monday_morning().await;

    setup
        .bookings
        .create_booking(setup.booking_request((10, 0), (11, 0)), today())
        .await
        .unwrap();

    let slots = setup
        .bookings
        .available_slots(setup.provider, today(), 60, today())
        .await
        .unwrap();

    // 09:30-10:30 and 10:30-11:30 both overlap the 10:00-11:00 booking.
    assert_eq!(slots, vec![slot((9, 0), (10, 0)), slot((11, 0), (12, 0))]);
}

#[tokio::test]
async fn blackout_override_empties_the_calendar() {
    let setup = TestSetup::with_monday_morning().await;

    setup
        .schedule
        .upsert_override(
            setup.provider,
            CreateOverrideRequest {
                date: today(),
                kind: OverrideKind::Blackout,
                slots: None,
                replace_existing: false,
            },
            today(),
        )
        .await
        .unwrap();

    let slots = setup
        .bookings
        .available_slots(setup.provider, today(), 60, today())
        .await
        .unwrap();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn slot_queries_validate_their_inputs() {
    let setup = TestSetup::with_monday_morning().await;

    let yesterday = today().pred_opt().unwrap();
    let result = setup
        .bookings
        .available_slots(setup.provider, yesterday, 60, today())
        .await;
    assert_matches!(
        result,
        Err(BookingError::Availability(AvailabilityError::InvalidDate(_)))
    );

    let result = setup
        .bookings
        .available_slots(setup.provider, today(), 20, today())
        .await;
    assert_matches!(
        result,
        Err(BookingError::Availability(AvailabilityError::InvalidDuration { .. }))
    );

    let result = setup
        .bookings
        .available_slots(Uuid::new_v4(), today(), 60, today())
        .await;
    assert_matches!(
        result,
        Err(BookingError::Availability(AvailabilityError::UnknownProvider(_)))
    );
}

#[tokio::test]
async fn every_offered_slot_sits_inside_an_availability_window() {
    let setup = TestSetup::with_monday_morning().await;

    let windows = setup
        .schedule
        .effective_availability(setup.provider, today())
        .await
        .unwrap();

    let slots = setup
        .bookings
        .available_slots(setup.provider, today(), 90, today())
        .await
        .unwrap();

    assert!(!slots.is_empty());
    for offered in &slots {
        assert_eq!(offered.duration_minutes(), 90);
        assert!(windows.windows().iter().any(|w| w.contains(offered)));
    }
}

// ==============================================================================
// BOOKING WRITE GATE
// ==============================================================================

#[tokio::test]
async fn booking_outside_availability_is_rejected() {
    let setup = TestSetup::with_monday_morning().await;

    // Starts inside the window but spills past its end.
    let result = setup
        .bookings
        .create_booking(setup.booking_request((11, 30), (12, 30)), today())
        .await;
    assert_matches!(result, Err(BookingError::OutsideAvailability));

    // Entirely outside.
    let result = setup
        .bookings
        .create_booking(setup.booking_request((14, 0), (15, 0)), today())
        .await;
    assert_matches!(result, Err(BookingError::OutsideAvailability));
}

#[tokio::test]
async fn stale_slot_cache_cannot_double_book() {
    let setup = TestSetup::with_monday_morning().await;

    // Both customers saw 10:00-11:00 as free; the second submit loses.
    setup
        .bookings
        .create_booking(setup.booking_request((10, 0), (11, 0)), today())
        .await
        .unwrap();
    let result = setup
        .bookings
        .create_booking(setup.booking_request((10, 30), (11, 30)), today())
        .await;
    assert_matches!(result, Err(BookingError::SlotAlreadyBooked));
}

#[tokio::test(flavor = "multi_thread")]
async fn racing_requests_for_the_same_window_admit_exactly_one() {
    let setup = TestSetup::with_monday_morning().await;

    let first = {
        let bookings = Arc::clone(&setup.bookings);
        let request = setup.booking_request((9, 0), (10, 0));
        tokio::spawn(async move { bookings.create_booking(request, today()).await })
    };
    let second = {
        let bookings = Arc::clone(&setup.bookings);
        let request = setup.booking_request((9, 0), (10, 0));
        tokio::spawn(async move { bookings.create_booking(request, today()).await })
    };

    let results = [first.await.unwrap(), second.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(BookingError::SlotAlreadyBooked))));

    let active = setup.bookings.provider_bookings(setup.provider, Some(today())).await;
    assert_eq!(active.len(), 1);
}

#[tokio::test]
async fn malformed_booking_requests_are_rejected() {
    let setup = TestSetup::with_monday_morning().await;

    let result = setup
        .bookings
        .create_booking(setup.booking_request((10, 0), (10, 0)), today())
        .await;
    assert_matches!(result, Err(BookingError::InvalidTimeRange));

    let mut request = setup.booking_request((9, 0), (10, 0));
    request.date = today().pred_opt().unwrap();
    let result = setup.bookings.create_booking(request, today()).await;
    assert_matches!(result, Err(BookingError::InvalidDate(_)));
}

#[tokio::test]
async fn cancelled_booking_frees_its_window() {
    let setup = TestSetup::with_monday_morning().await;

    let request = setup.booking_request((10, 0), (11, 0));
    let customer = request.customer_id;
    let booking = setup.bookings.create_booking(request, today()).await.unwrap();

    setup
        .bookings
        .transition(
            booking.id,
            BookingStatus::Cancelled,
            Actor { id: customer, role: ActorRole::Customer },
        )
        .await
        .unwrap();

    // The window is browsable again and bookable again.
    let slots = setup
        .bookings
        .available_slots(setup.provider, today(), 60, today())
        .await
        .unwrap();
    assert!(slots.contains(&slot((10, 0), (11, 0))));

    setup
        .bookings
        .create_booking(setup.booking_request((10, 0), (11, 0)), today())
        .await
        .expect("freed window should be bookable");
}

// ==============================================================================
// STATUS MACHINE
// ==============================================================================

#[tokio::test]
async fn provider_walks_the_happy_path_to_completed() {
    let setup = TestSetup::with_monday_morning().await;
    let provider_actor = Actor { id: setup.provider, role: ActorRole::Provider };

    let booking = setup
        .bookings
        .create_booking(setup.booking_request((9, 0), (10, 0)), today())
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);

    for status in [
        BookingStatus::Confirmed,
        BookingStatus::InProgress,
        BookingStatus::Completed,
    ] {
        let updated = setup
            .bookings
            .transition(booking.id, status.clone(), provider_actor)
            .await
            .unwrap();
        assert_eq!(updated.status, status);
    }
}

#[tokio::test]
async fn skipping_states_and_terminal_exits_are_rejected() {
    let setup = TestSetup::with_monday_morning().await;
    let provider_actor = Actor { id: setup.provider, role: ActorRole::Provider };

    let booking = setup
        .bookings
        .create_booking(setup.booking_request((9, 0), (10, 0)), today())
        .await
        .unwrap();

    // pending -> completed skips two states.
    let result = setup
        .bookings
        .transition(booking.id, BookingStatus::Completed, provider_actor)
        .await;
    assert_matches!(result, Err(BookingError::InvalidStatusTransition { .. }));

    setup
        .bookings
        .transition(booking.id, BookingStatus::Declined, provider_actor)
        .await
        .unwrap();

    // Declined is terminal.
    let result = setup
        .bookings
        .transition(booking.id, BookingStatus::Confirmed, provider_actor)
        .await;
    assert_matches!(result, Err(BookingError::InvalidStatusTransition { .. }));
}

#[tokio::test]
async fn role_and_ownership_gate_every_transition() {
    let setup = TestSetup::with_monday_morning().await;

    let request = setup.booking_request((9, 0), (10, 0));
    let customer = request.customer_id;
    let booking = setup.bookings.create_booking(request, today()).await.unwrap();

    // A customer cannot confirm their own booking.
    let result = setup
        .bookings
        .transition(
            booking.id,
            BookingStatus::Confirmed,
            Actor { id: customer, role: ActorRole::Customer },
        )
        .await;
    assert_matches!(result, Err(BookingError::InvalidStatusTransition { .. }));

    // A different provider cannot confirm it either.
    let result = setup
        .bookings
        .transition(
            booking.id,
            BookingStatus::Confirmed,
            Actor { id: Uuid::new_v4(), role: ActorRole::Provider },
        )
        .await;
    assert_matches!(result, Err(BookingError::InvalidStatusTransition { .. }));

    // A stranger cannot cancel someone else's booking.
    let result = setup
        .bookings
        .transition(
            booking.id,
            BookingStatus::Cancelled,
            Actor { id: Uuid::new_v4(), role: ActorRole::Customer },
        )
        .await;
    assert_matches!(result, Err(BookingError::InvalidStatusTransition { .. }));

    // The owning customer can still cancel after confirmation.
    setup
        .bookings
        .transition(
            booking.id,
            BookingStatus::Confirmed,
            Actor { id: setup.provider, role: ActorRole::Provider },
        )
        .await
        .unwrap();
    setup
        .bookings
        .transition(
            booking.id,
            BookingStatus::Cancelled,
            Actor { id: customer, role: ActorRole::Customer },
        )
        .await
        .expect("owning customer may cancel a confirmed booking");
}

#[tokio::test]
async fn unknown_booking_id_is_not_found() {
    let setup = TestSetup::with_monday_morning().await;

    let result = setup.bookings.get_booking(Uuid::new_v4()).await;
    assert_matches!(result, Err(BookingError::NotFound));

    let result = setup
        .bookings
        .transition(
            Uuid::new_v4(),
            BookingStatus::Confirmed,
            Actor { id: setup.provider, role: ActorRole::Provider },
        )
        .await;
    assert_matches!(result, Err(BookingError::NotFound));
}

#[tokio::test]
async fn custom_override_supersedes_weekly_slots() {
    let setup = TestSetup::with_monday_morning().await;

    setup
        .schedule
        .upsert_override(
            setup.provider,
            CreateOverrideRequest {
                date: today(),
                kind: OverrideKind::Custom,
                slots: Some(vec![slot((15, 0), (17, 0))]),
                replace_existing: false,
            },
            today(),
        )
        .await
        .unwrap();

    let slots = setup
        .bookings
        .available_slots(setup.provider, today(), 60, today())
        .await
        .unwrap();

    // Nothing from the 09:00-12:00 weekly pattern survives.
    assert_eq!(
        slots,
        vec![
            slot((15, 0), (16, 0)),
            slot((15, 30), (16, 30)),
            slot((16, 0), (17, 0)),
        ]
    );

    // And the write path honors the override too.
    let result = setup
        .bookings
        .create_booking(setup.booking_request((9, 0), (10, 0)), today())
        .await;
    assert_matches!(result, Err(BookingError::OutsideAvailability));
}
