// libs/availability-cell/src/services/slots.rs
//
// Pure slot generation: slice availability windows into duration-sized
// candidates and subtract already-booked intervals. The caller supplies
// both inputs; nothing here touches a store.

use chrono::Duration;

use crate::models::TimeSlot;
use crate::services::overlap::intervals_overlap;

/// Calendar browsing granularity. Candidates start every 30 minutes
/// regardless of the requested service duration, so services of
/// different lengths share consistent-looking start times.
pub const SLOT_STEP_MINUTES: i64 = 30;

/// Produce the bookable slots of length `duration_minutes` inside
/// `windows`, dropping any candidate that overlaps a `busy` interval.
/// Result is sorted by start time; empty is a normal outcome.
pub fn candidate_slots(
    windows: &[TimeSlot],
    duration_minutes: i64,
    busy: &[TimeSlot],
) -> Vec<TimeSlot> {
    let mut slots = Vec::new();

    for window in windows {
        let span = window.duration_minutes();
        if span < duration_minutes {
            // Window cannot fit even one slot.
            continue;
        }

        let mut offset = 0i64;
        while offset + duration_minutes <= span {
            let candidate = TimeSlot::new(
                window.start + Duration::minutes(offset),
                window.start + Duration::minutes(offset + duration_minutes),
            );

            if !busy.iter().any(|taken| intervals_overlap(&candidate, taken)) {
                slots.push(candidate);
            }

            offset += SLOT_STEP_MINUTES;
        }
    }

    // Windows are non-overlapping by construction of the write gates, but
    // the generator must not assume ordering across windows.
    slots.sort_by(|a, b| a.start.cmp(&b.start));
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn slot(start: (u32, u32), end: (u32, u32)) -> TimeSlot {
        TimeSlot::new(
            NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        )
    }

    #[test]
    fn sixty_minute_service_in_three_hour_window() {
        // 09:00-12:00 at 30-minute steps yields five sliding candidates.
        let slots = candidate_slots(&[slot((9, 0), (12, 0))], 60, &[]);
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

    #[test]
    fn booked_interval_removes_overlapping_candidates() {
        let busy = [slot((10, 0), (11, 0))];
        let slots = candidate_slots(&[slot((9, 0), (12, 0))], 60, &busy);
        assert_eq!(slots, vec![slot((9, 0), (10, 0)), slot((11, 0), (12, 0))]);
    }

    #[test]
    fn last_candidate_ends_exactly_at_window_end() {
        let slots = candidate_slots(&[slot((9, 0), (11, 0))], 60, &[]);
        assert_eq!(
            slots,
            vec![
                slot((9, 0), (10, 0)),
                slot((9, 30), (10, 30)),
                slot((10, 0), (11, 0)),
            ]
        );
    }

    #[test]
    fn window_shorter_than_duration_is_skipped() {
        let slots = candidate_slots(&[slot((9, 0), (9, 45))], 60, &[]);
        assert!(slots.is_empty());
    }

    #[test]
    fn every_slot_has_requested_length_and_stays_in_a_window() {
        let windows = [slot((9, 0), (11, 30)), slot((14, 0), (16, 0))];
        let slots = candidate_slots(&windows, 90, &[]);
        assert!(!slots.is_empty());
        for generated in &slots {
            assert_eq!(generated.duration_minutes(), 90);
            assert!(windows.iter().any(|window| window.contains(generated)));
        }
    }

    #[test]
    fn windows_are_concatenated_in_start_order() {
        // Deliberately out of order input.
        let windows = [slot((14, 0), (15, 0)), slot((9, 0), (10, 0))];
        let slots = candidate_slots(&windows, 60, &[]);
        assert_eq!(slots, vec![slot((9, 0), (10, 0)), slot((14, 0), (15, 0))]);
    }

    #[test]
    fn back_to_back_booking_does_not_block_adjacent_slot() {
        let busy = [slot((10, 0), (11, 0))];
        let slots = candidate_slots(&[slot((9, 0), (10, 0))], 60, &busy);
        assert_eq!(slots, vec![slot((9, 0), (10, 0))]);
    }
}
