//! Per-question scheduling state owned by the review scheduler.

use super::QuestionId;
use crate::clock::days_between;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn from_correct(correct: bool) -> Self {
        if correct {
            Outcome::Success
        } else {
            Outcome::Failure
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewEvent {
    pub timestamp: DateTime<Utc>,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub question_id: QuestionId,
    /// Proficiency level, always within `0..=max_level` of the interval table.
    pub level: u8,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub last_succeeded_at: Option<DateTime<Utc>>,
    pub next_due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub review_history: Vec<ReviewEvent>,
    #[serde(default)]
    pub correct_count: u32,
    #[serde(default)]
    pub wrong_count: u32,
    /// Derived; refreshed from elapsed time whenever the item is read.
    pub retention_rate: f64,
    /// Derived; refreshed together with `retention_rate`.
    pub forgetting_risk: f64,
}

impl ReviewItem {
    pub fn new(question_id: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            level: 0,
            last_reviewed_at: None,
            last_succeeded_at: None,
            next_due_at: None,
            review_history: Vec::new(),
            correct_count: 0,
            wrong_count: 0,
            retention_rate: 100.0,
            forgetting_risk: 0.0,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_due_at.is_some_and(|due| due <= now)
    }

    /// Days past the due date, never negative. Zero for items never scheduled.
    pub fn overdue_days(&self, now: DateTime<Utc>) -> f64 {
        self.next_due_at
            .map(|due| days_between(due, now).max(0.0))
            .unwrap_or(0.0)
    }

    pub fn last_failed_at(&self) -> Option<DateTime<Utc>> {
        self.review_history
            .iter()
            .rev()
            .find(|event| event.outcome == Outcome::Failure)
            .map(|event| event.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_overdue_days_clamps_at_zero() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let mut item = ReviewItem::new("Q1");
        assert_eq!(item.overdue_days(now), 0.0);
        assert!(!item.is_due(now));

        item.next_due_at = Some(now + Duration::days(2));
        assert_eq!(item.overdue_days(now), 0.0);
        assert!(!item.is_due(now));

        item.next_due_at = Some(now - Duration::days(5));
        assert!((item.overdue_days(now) - 5.0).abs() < 1e-9);
        assert!(item.is_due(now));
    }

    #[test]
    fn test_serializes_camel_case() {
        let item = ReviewItem::new("Q1");
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("nextDueAt").is_some());
        assert!(json.get("reviewHistory").is_some());
        assert!(json.get("retentionRate").is_some());
    }
}
