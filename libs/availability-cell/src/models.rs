// libs/availability-cell/src/models.rs
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_models::AppError;

// ==============================================================================
// CORE AVAILABILITY MODELS
// ==============================================================================

/// A half-open [start,end) time range on a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Whole-minute length of the slot. Negative when end precedes start.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// True when `inner` lies fully inside this slot.
    pub fn contains(&self, inner: &TimeSlot) -> bool {
        self.start <= inner.start && inner.end <= self.end
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// Recurring weekly availability for one provider weekday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyAvailabilityRule {
    pub id: Uuid,
    pub provider_id: Uuid,
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WeeklyAvailabilityRule {
    pub fn window(&self) -> TimeSlot {
        TimeSlot::new(self.start_time, self.end_time)
    }
}

/// Map a calendar date onto the 0..=6 weekday scheme used by weekly rules.
pub fn day_of_week_for(date: NaiveDate) -> i32 {
    match date.weekday() {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideKind {
    Blackout,
    Vacation,
    Custom,
}

impl fmt::Display for OverrideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideKind::Blackout => write!(f, "blackout"),
            OverrideKind::Vacation => write!(f, "vacation"),
            OverrideKind::Custom => write!(f, "custom"),
        }
    }
}

/// Date-specific replacement of the weekly pattern. Exactly one per
/// (provider, date); `slots` is populated only for the custom kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateOverride {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub date: NaiveDate,
    pub kind: OverrideKind,
    pub slots: Vec<TimeSlot>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of resolving override precedence for a (provider, date).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectiveAvailability {
    /// Blackout/vacation override, or a weekday with no rules defined.
    Unavailable,
    Windows(Vec<TimeSlot>),
}

impl EffectiveAvailability {
    pub fn windows(&self) -> &[TimeSlot] {
        match self {
            EffectiveAvailability::Unavailable => &[],
            EffectiveAvailability::Windows(windows) => windows,
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWeeklyRuleRequest {
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOverrideRequest {
    pub date: NaiveDate,
    pub kind: OverrideKind,
    pub slots: Option<Vec<TimeSlot>>,
    /// Replace-on-conflict; without it a same-date write is rejected.
    #[serde(default)]
    pub replace_existing: bool,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AvailabilityError {
    #[error("Availability window must be at least {min} minutes, got {got}")]
    InvalidDuration { min: i64, got: i64 },

    #[error("Availability window overlaps an existing one for that day")]
    OverlapConflict,

    #[error("Date {0} is in the past")]
    DateInPast(NaiveDate),

    #[error("Requested date {0} is in the past")]
    InvalidDate(NaiveDate),

    #[error("Invalid slot set: {0}")]
    InvalidSlotSet(String),

    #[error("An override already exists for {0}")]
    DuplicateOverride(NaiveDate),

    #[error("Day of week must be between 0 (Sunday) and 6 (Saturday), got {0}")]
    InvalidDayOfWeek(i32),

    #[error("Unknown provider {0}")]
    UnknownProvider(Uuid),
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match &err {
            AvailabilityError::InvalidDuration { .. }
            | AvailabilityError::DateInPast(_)
            | AvailabilityError::InvalidDate(_)
            | AvailabilityError::InvalidSlotSet(_)
            | AvailabilityError::InvalidDayOfWeek(_) => AppError::Validation(err.to_string()),
            AvailabilityError::OverlapConflict | AvailabilityError::DuplicateOverride(_) => {
                AppError::Conflict(err.to_string())
            }
            AvailabilityError::UnknownProvider(_) => AppError::NotFound(err.to_string()),
        }
    }
}
