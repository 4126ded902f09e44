//! Review scheduler: a leveled spaced-repetition scheme.
//!
//! Each question climbs a fixed interval table on success and drops back to
//! level 0 on failure:
//! - success: `level = min(level + 1, max)`, due `now + interval(level)` days
//! - failure: `level = 0`, due `now + interval(0)` days
//!
//! Retention is estimated with a logarithmic decay
//! `100 / (1 + k / (level + 1) * ln(days + 1))`, so higher levels fade slower.

use crate::clock::{Clock, days_between};
use crate::config::{MAX_INTERVAL_DAYS, SchedulerPolicy};
use crate::database::{KeyValueStore, REVIEW_SCHEDULE_KEY, load_json, save_json};
use crate::diagnostics::Diagnostics;
use crate::models::{Outcome, QuestionId, ReviewEvent, ReviewItem};
use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

/// Aggregate view over every scheduled question.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleStats {
    pub total: usize,
    pub due: usize,
    /// Items at the top level of the interval table.
    pub mastered: usize,
    /// Count of items per level, index = level.
    pub by_level: Vec<usize>,
    /// Mean retention over items with a known retention.
    pub average_retention: Option<f64>,
}

pub struct Scheduler {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    policy: SchedulerPolicy,
    diagnostics: Diagnostics,
    items: IndexMap<QuestionId, ReviewItem>,
}

impl Scheduler {
    /// Loads the persisted schedule. Corrupt state falls back to empty.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        policy: SchedulerPolicy,
        diagnostics: Diagnostics,
    ) -> Self {
        let mut items: IndexMap<QuestionId, ReviewItem> =
            load_json(store.as_ref(), REVIEW_SCHEDULE_KEY, &diagnostics);
        let max_level = policy.max_level();
        for item in items.values_mut() {
            item.level = item.level.min(max_level);
        }
        Self {
            store,
            clock,
            policy,
            diagnostics,
            items,
        }
    }

    pub fn policy(&self) -> &SchedulerPolicy {
        &self.policy
    }

    pub fn interval_days(&self, level: u8) -> u32 {
        self.policy.interval_days(level)
    }

    /// Applies one answer outcome and persists the schedule.
    pub fn record_review(&mut self, question_id: &str, success: bool) -> ReviewItem {
        let now = self.clock.now();
        let current = self
            .items
            .get(question_id)
            .cloned()
            .unwrap_or_else(|| ReviewItem::new(question_id));

        let updated = next_review(&current, Outcome::from_correct(success), now, &self.policy);
        debug!(
            question_id,
            success,
            "level {} -> {}, next due {:?}",
            current.level,
            updated.level,
            updated.next_due_at
        );

        self.items.insert(question_id.to_string(), updated.clone());
        self.persist();
        updated
    }

    /// Every item with `next_due_at <= now`, in insertion order.
    pub fn due_items(&self, now: DateTime<Utc>) -> Vec<ReviewItem> {
        self.items
            .values()
            .filter(|item| item.is_due(now))
            .map(|item| self.refreshed(item, now))
            .collect()
    }

    pub fn item(&self, question_id: &str) -> Option<ReviewItem> {
        let now = self.clock.now();
        self.items.get(question_id).map(|item| self.refreshed(item, now))
    }

    pub fn items(&self) -> Vec<ReviewItem> {
        let now = self.clock.now();
        self.items.values().map(|item| self.refreshed(item, now)).collect()
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.items.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn remove(&mut self, question_id: &str) -> Option<ReviewItem> {
        let removed = self.items.shift_remove(question_id);
        if removed.is_some() {
            self.persist();
        }
        removed
    }

    /// Retention at `now`, or `None` for an item never answered correctly.
    pub fn estimate_retention(&self, item: &ReviewItem, now: DateTime<Utc>) -> Option<f64> {
        let last_success = item.last_succeeded_at?;
        let days = days_between(last_success, now).max(0.0);
        Some(estimate_retention(days, item.level, self.policy.decay_constant))
    }

    pub fn estimate_forgetting_risk(&self, retention: f64, wrong_count: u32) -> f64 {
        estimate_forgetting_risk(retention, wrong_count, &self.policy)
    }

    pub fn stats(&self, now: DateTime<Utc>) -> ScheduleStats {
        let max_level = self.policy.max_level();
        let mut by_level = vec![0; max_level as usize + 1];
        let mut retention_sum = 0.0;
        let mut retention_known = 0usize;
        let mut due = 0;

        for item in self.items.values() {
            by_level[item.level.min(max_level) as usize] += 1;
            if item.is_due(now) {
                due += 1;
            }
            if let Some(retention) = self.estimate_retention(item, now) {
                retention_sum += retention;
                retention_known += 1;
            }
        }

        ScheduleStats {
            total: self.items.len(),
            due,
            mastered: by_level[max_level as usize],
            by_level,
            average_retention: (retention_known > 0)
                .then(|| retention_sum / retention_known as f64),
        }
    }

    /// Snapshot of the raw persisted map, for backups.
    pub fn snapshot(&self) -> IndexMap<QuestionId, ReviewItem> {
        self.items.clone()
    }

    /// Replaces all state and persists it.
    pub fn replace_all(&mut self, items: IndexMap<QuestionId, ReviewItem>) {
        let max_level = self.policy.max_level();
        self.items = items;
        for item in self.items.values_mut() {
            item.level = item.level.min(max_level);
        }
        self.persist();
    }

    /// Recomputes derived retention and risk. Items whose last answer was a
    /// failure keep the fixed failure values until their next success.
    fn refreshed(&self, item: &ReviewItem, now: DateTime<Utc>) -> ReviewItem {
        let mut item = item.clone();
        let last_was_success = item
            .review_history
            .last()
            .is_some_and(|event| event.outcome == Outcome::Success);
        if last_was_success {
            if let Some(retention) = self.estimate_retention(&item, now) {
                item.retention_rate = retention;
                item.forgetting_risk = self.estimate_forgetting_risk(retention, item.wrong_count);
            }
        }
        item
    }

    fn persist(&self) {
        save_json(self.store.as_ref(), REVIEW_SCHEDULE_KEY, &self.items, &self.diagnostics);
    }
}

/// Calculates the item state after one review.
pub fn next_review(
    item: &ReviewItem,
    outcome: Outcome,
    now: DateTime<Utc>,
    policy: &SchedulerPolicy,
) -> ReviewItem {
    let mut next = item.clone();
    next.last_reviewed_at = Some(now);
    next.review_history.push(ReviewEvent {
        timestamp: now,
        outcome,
    });

    match outcome {
        Outcome::Success => {
            // Climb one level, capped at the top of the table.
            next.level = item.level.saturating_add(1).min(policy.max_level());
            next.last_succeeded_at = Some(now);
            next.correct_count += 1;
            next.retention_rate = 100.0;
            next.forgetting_risk = 0.0;
        }
        Outcome::Failure => {
            // Any miss starts the climb over.
            next.level = 0;
            next.wrong_count += 1;
            next.retention_rate = policy.failure_retention;
            next.forgetting_risk = policy.failure_risk;
        }
    }

    // The interval comes from the level just reached.
    let delay = policy.interval_days(next.level).min(MAX_INTERVAL_DAYS);
    let due = Duration::try_days(delay as i64).and_then(|d| now.checked_add_signed(d));
    next.next_due_at = Some(due.unwrap_or(DateTime::<Utc>::MAX_UTC));
    next
}

/// `100 / (1 + decay * ln(days + 1))` with `decay = k / (level + 1)`, in `[0, 100]`.
pub fn estimate_retention(days_since_success: f64, level: u8, decay_constant: f64) -> f64 {
    let days = days_since_success.max(0.0);
    let decay = decay_constant / (level as f64 + 1.0);
    let retention = 100.0 / (1.0 + decay * (days + 1.0).ln());
    if retention.is_nan() {
        return 0.0;
    }
    retention.clamp(0.0, 100.0)
}

pub fn estimate_forgetting_risk(retention: f64, wrong_count: u32, policy: &SchedulerPolicy) -> f64 {
    let penalty = (wrong_count as f64 * policy.wrong_penalty).min(policy.wrong_penalty_cap);
    ((100.0 - retention) + penalty).min(100.0)
}
