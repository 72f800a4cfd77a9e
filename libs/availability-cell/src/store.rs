// libs/availability-cell/src/store.rs
//
// In-memory schedule store striped by provider id. Every write gate runs
// while the provider's stripe is held for writing, so a rejected write
// never leaves partial state behind. Rule writes contend on the provider
// stripe only; booking writes live in their own ledger and never block
// schedule changes.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    AvailabilityError, DateOverride, EffectiveAvailability, OverrideKind, TimeSlot,
    WeeklyAvailabilityRule, day_of_week_for,
};
use crate::services::overlap::{check_against_existing, check_duration, validate_slot_set};

#[derive(Debug, Default)]
struct ProviderSchedule {
    weekly: Vec<WeeklyAvailabilityRule>,
    overrides: Vec<DateOverride>,
}

#[derive(Debug, Default)]
pub struct ScheduleStore {
    providers: RwLock<HashMap<Uuid, Arc<RwLock<ProviderSchedule>>>>,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stripe for a provider, created on first write.
    async fn stripe(&self, provider_id: Uuid) -> Arc<RwLock<ProviderSchedule>> {
        let mut providers = self.providers.write().await;
        providers
            .entry(provider_id)
            .or_insert_with(|| Arc::new(RwLock::new(ProviderSchedule::default())))
            .clone()
    }

    async fn existing_stripe(&self, provider_id: Uuid) -> Option<Arc<RwLock<ProviderSchedule>>> {
        self.providers.read().await.get(&provider_id).cloned()
    }

    /// Insert a weekly rule, enforcing the duration and non-overlap
    /// invariants against the provider's other rules for the same weekday.
    pub async fn insert_weekly_rule(
        &self,
        rule: WeeklyAvailabilityRule,
    ) -> Result<Uuid, AvailabilityError> {
        let stripe = self.stripe(rule.provider_id).await;
        let mut schedule = stripe.write().await;

        check_duration(&rule.window())?;

        let same_day: Vec<TimeSlot> = schedule
            .weekly
            .iter()
            .filter(|existing| existing.day_of_week == rule.day_of_week)
            .map(|existing| existing.window())
            .collect();
        check_against_existing(&rule.window(), &same_day)?;

        let rule_id = rule.id;
        schedule.weekly.push(rule);
        Ok(rule_id)
    }

    /// Idempotent: deleting an absent rule is a no-op.
    pub async fn delete_weekly_rule(&self, provider_id: Uuid, rule_id: Uuid) {
        if let Some(stripe) = self.existing_stripe(provider_id).await {
            let mut schedule = stripe.write().await;
            schedule.weekly.retain(|rule| rule.id != rule_id);
        }
    }

    /// Insert a date override. A custom slot list is validated as a set
    /// inside the stripe lock; a same-date override is rejected unless
    /// `replace_existing` is set, in which case it is swapped atomically.
    pub async fn insert_override(
        &self,
        date_override: DateOverride,
        replace_existing: bool,
    ) -> Result<Uuid, AvailabilityError> {
        let stripe = self.stripe(date_override.provider_id).await;
        let mut schedule = stripe.write().await;

        if date_override.kind == OverrideKind::Custom {
            validate_slot_set(&date_override.slots)?;
        }

        if schedule
            .overrides
            .iter()
            .any(|existing| existing.date == date_override.date)
        {
            if !replace_existing {
                return Err(AvailabilityError::DuplicateOverride(date_override.date));
            }
            schedule
                .overrides
                .retain(|existing| existing.date != date_override.date);
        }

        let override_id = date_override.id;
        schedule.overrides.push(date_override);
        Ok(override_id)
    }

    /// Idempotent: deleting an absent override is a no-op.
    pub async fn delete_override(&self, provider_id: Uuid, override_id: Uuid) {
        if let Some(stripe) = self.existing_stripe(provider_id).await {
            let mut schedule = stripe.write().await;
            schedule.overrides.retain(|o| o.id != override_id);
        }
    }

    pub async fn weekly_rules(&self, provider_id: Uuid) -> Vec<WeeklyAvailabilityRule> {
        match self.existing_stripe(provider_id).await {
            Some(stripe) => {
                let schedule = stripe.read().await;
                let mut rules = schedule.weekly.clone();
                rules.sort_by(|a, b| {
                    (a.day_of_week, a.start_time).cmp(&(b.day_of_week, b.start_time))
                });
                rules
            }
            None => Vec::new(),
        }
    }

    pub async fn overrides(&self, provider_id: Uuid) -> Vec<DateOverride> {
        match self.existing_stripe(provider_id).await {
            Some(stripe) => {
                let schedule = stripe.read().await;
                let mut overrides = schedule.overrides.clone();
                overrides.sort_by_key(|o| o.date);
                overrides
            }
            None => Vec::new(),
        }
    }

    /// Resolve override precedence for one date: blackout/vacation win
    /// with no windows, a custom override contributes exactly its slot
    /// list, otherwise the weekday's weekly rules apply.
    pub async fn effective_availability(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
    ) -> Result<EffectiveAvailability, AvailabilityError> {
        let stripe = self
            .existing_stripe(provider_id)
            .await
            .ok_or(AvailabilityError::UnknownProvider(provider_id))?;
        let schedule = stripe.read().await;

        if let Some(date_override) = schedule.overrides.iter().find(|o| o.date == date) {
            return Ok(match date_override.kind {
                OverrideKind::Blackout | OverrideKind::Vacation => {
                    EffectiveAvailability::Unavailable
                }
                OverrideKind::Custom => {
                    let mut windows = date_override.slots.clone();
                    windows.sort_by(|a, b| a.start.cmp(&b.start));
                    EffectiveAvailability::Windows(windows)
                }
            });
        }

        let day_of_week = day_of_week_for(date);
        let mut windows: Vec<TimeSlot> = schedule
            .weekly
            .iter()
            .filter(|rule| rule.day_of_week == day_of_week)
            .map(|rule| rule.window())
            .collect();
        windows.sort_by(|a, b| a.start.cmp(&b.start));

        Ok(EffectiveAvailability::Windows(windows))
    }
}
