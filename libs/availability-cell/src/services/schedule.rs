// libs/availability-cell/src/services/schedule.rs
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{
    AvailabilityError, CreateOverrideRequest, CreateWeeklyRuleRequest, DateOverride,
    EffectiveAvailability, OverrideKind, WeeklyAvailabilityRule,
};
use crate::store::ScheduleStore;

/// Provider schedule management: weekly rules, date overrides, and the
/// override-precedence read used by slot generation and booking writes.
pub struct ScheduleService {
    store: Arc<ScheduleStore>,
}

impl ScheduleService {
    pub fn new(store: Arc<ScheduleStore>) -> Self {
        Self { store }
    }

    pub async fn upsert_weekly_rule(
        &self,
        provider_id: Uuid,
        request: CreateWeeklyRuleRequest,
    ) -> Result<WeeklyAvailabilityRule, AvailabilityError> {
        debug!("Creating weekly rule for provider {}", provider_id);

        if !(0..=6).contains(&request.day_of_week) {
            return Err(AvailabilityError::InvalidDayOfWeek(request.day_of_week));
        }

        let now = Utc::now();
        let rule = WeeklyAvailabilityRule {
            id: Uuid::new_v4(),
            provider_id,
            day_of_week: request.day_of_week,
            start_time: request.start_time,
            end_time: request.end_time,
            created_at: now,
            updated_at: now,
        };

        // Duration and overlap gates run inside the store's provider lock.
        let rule_id = self.store.insert_weekly_rule(rule.clone()).await?;

        info!(
            "Weekly rule {} created for provider {} on day {}",
            rule_id, provider_id, rule.day_of_week
        );
        Ok(rule)
    }

    pub async fn upsert_override(
        &self,
        provider_id: Uuid,
        request: CreateOverrideRequest,
        today: NaiveDate,
    ) -> Result<DateOverride, AvailabilityError> {
        debug!(
            "Creating {} override for provider {} on {}",
            request.kind, provider_id, request.date
        );

        if request.date < today {
            return Err(AvailabilityError::DateInPast(request.date));
        }

        let slots = match request.kind {
            OverrideKind::Custom => request.slots.unwrap_or_default(),
            OverrideKind::Blackout | OverrideKind::Vacation => {
                if request.slots.as_deref().is_some_and(|slots| !slots.is_empty()) {
                    return Err(AvailabilityError::InvalidSlotSet(format!(
                        "{} override must not carry slots",
                        request.kind
                    )));
                }
                Vec::new()
            }
        };

        let date_override = DateOverride {
            id: Uuid::new_v4(),
            provider_id,
            date: request.date,
            kind: request.kind,
            slots,
            created_at: Utc::now(),
        };

        let override_id = self
            .store
            .insert_override(date_override.clone(), request.replace_existing)
            .await?;

        info!(
            "Override {} ({}) stored for provider {} on {}",
            override_id, date_override.kind, provider_id, date_override.date
        );
        Ok(date_override)
    }

    /// Idempotent; removing a rule never affects past bookings.
    pub async fn delete_weekly_rule(&self, provider_id: Uuid, rule_id: Uuid) {
        debug!("Deleting weekly rule {} for provider {}", rule_id, provider_id);
        self.store.delete_weekly_rule(provider_id, rule_id).await;
    }

    /// Idempotent.
    pub async fn delete_override(&self, provider_id: Uuid, override_id: Uuid) {
        debug!("Deleting override {} for provider {}", override_id, provider_id);
        self.store.delete_override(provider_id, override_id).await;
    }

    pub async fn weekly_rules(&self, provider_id: Uuid) -> Vec<WeeklyAvailabilityRule> {
        self.store.weekly_rules(provider_id).await
    }

    pub async fn overrides(&self, provider_id: Uuid) -> Vec<DateOverride> {
        self.store.overrides(provider_id).await
    }

    pub async fn effective_availability(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
    ) -> Result<EffectiveAvailability, AvailabilityError> {
        self.store.effective_availability(provider_id, date).await
    }
}
