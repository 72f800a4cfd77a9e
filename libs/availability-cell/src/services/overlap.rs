// libs/availability-cell/src/services/overlap.rs
//
// Pure interval math shared by the schedule write gates and the booking
// conflict checks. No I/O here; the transactional wrappers call these
// against freshly-read state.

use crate::models::{AvailabilityError, TimeSlot};

/// Minimum length of any availability window or custom-override slot.
pub const MIN_RULE_MINUTES: i64 = 30;

/// Half-open overlap check: [a.start,a.end) and [b.start,b.end) overlap
/// iff a.start < b.end && b.start < a.end. Touching-but-adjacent windows
/// (09:00-10:00 and 10:00-11:00) do not overlap.
pub fn intervals_overlap(a: &TimeSlot, b: &TimeSlot) -> bool {
    a.start < b.end && b.start < a.end
}

/// Gate for a single availability window: end after start, at least
/// `MIN_RULE_MINUTES` long, measured in whole minutes.
pub fn check_duration(slot: &TimeSlot) -> Result<(), AvailabilityError> {
    let minutes = slot.duration_minutes();
    if minutes < MIN_RULE_MINUTES {
        return Err(AvailabilityError::InvalidDuration {
            min: MIN_RULE_MINUTES,
            got: minutes,
        });
    }
    Ok(())
}

/// Gate a candidate window against the windows already stored for the
/// same contention key (provider + weekday).
pub fn check_against_existing(
    candidate: &TimeSlot,
    existing: &[TimeSlot],
) -> Result<(), AvailabilityError> {
    if existing.iter().any(|slot| intervals_overlap(candidate, slot)) {
        return Err(AvailabilityError::OverlapConflict);
    }
    Ok(())
}

/// Validate a custom override's slot list as a set: non-empty, each slot
/// meeting the minimum duration, no two slots overlapping.
pub fn validate_slot_set(slots: &[TimeSlot]) -> Result<(), AvailabilityError> {
    if slots.is_empty() {
        return Err(AvailabilityError::InvalidSlotSet(
            "custom override requires at least one slot".to_string(),
        ));
    }

    for slot in slots {
        let minutes = slot.duration_minutes();
        if minutes < MIN_RULE_MINUTES {
            return Err(AvailabilityError::InvalidSlotSet(format!(
                "slot {} is shorter than {} minutes",
                slot, MIN_RULE_MINUTES
            )));
        }
    }

    for (i, a) in slots.iter().enumerate() {
        for b in slots.iter().skip(i + 1) {
            if intervals_overlap(a, b) {
                return Err(AvailabilityError::InvalidSlotSet(format!(
                    "slots {} and {} overlap",
                    a, b
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveTime;

    fn slot(start: (u32, u32), end: (u32, u32)) -> TimeSlot {
        TimeSlot::new(
            NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        )
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = slot((9, 0), (10, 30));
        let b = slot((10, 0), (11, 0));
        assert!(intervals_overlap(&a, &b));
        assert!(intervals_overlap(&b, &a));

        let c = slot((12, 0), (13, 0));
        assert!(!intervals_overlap(&a, &c));
        assert!(!intervals_overlap(&c, &a));
    }

    #[test]
    fn adjacent_slots_do_not_overlap() {
        let morning = slot((9, 0), (10, 0));
        let next = slot((10, 0), (11, 0));
        assert!(!intervals_overlap(&morning, &next));
    }

    #[test]
    fn identical_slots_overlap() {
        let a = slot((9, 0), (10, 0));
        assert!(intervals_overlap(&a, &a.clone()));
    }

    #[test]
    fn containment_counts_as_overlap() {
        let outer = slot((9, 0), (12, 0));
        let inner = slot((10, 0), (10, 30));
        assert!(intervals_overlap(&outer, &inner));
        assert!(intervals_overlap(&inner, &outer));
    }

    #[test]
    fn sub_minimum_duration_is_rejected() {
        assert_matches!(
            check_duration(&slot((9, 0), (9, 20))),
            Err(AvailabilityError::InvalidDuration { min: 30, got: 20 })
        );
        assert!(check_duration(&slot((9, 0), (9, 30))).is_ok());
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert_matches!(
            check_duration(&slot((10, 0), (9, 0))),
            Err(AvailabilityError::InvalidDuration { .. })
        );
    }

    #[test]
    fn slot_set_rejects_empty_and_overlapping() {
        assert_matches!(
            validate_slot_set(&[]),
            Err(AvailabilityError::InvalidSlotSet(_))
        );

        let overlapping = [slot((9, 0), (10, 0)), slot((9, 30), (10, 30))];
        assert_matches!(
            validate_slot_set(&overlapping),
            Err(AvailabilityError::InvalidSlotSet(_))
        );

        let adjacent = [slot((9, 0), (10, 0)), slot((10, 0), (11, 0))];
        assert!(validate_slot_set(&adjacent).is_ok());
    }
}
