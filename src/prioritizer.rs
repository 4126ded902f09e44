//! Unified review prioritizer.
//!
//! Merges three candidate sources into one ranked list:
//! 1. scheduler items that are due,
//! 2. every wrong-answer ledger record,
//! 3. up to N ledger records from each weak category.
//!
//! Each candidate gets an additive score from [`PriorityPolicy`]. Duplicates
//! keep their highest score, the list is stably sorted descending, and each
//! entry is bucketed into a [`Tier`].

use crate::clock::days_between;
use crate::config::PriorityPolicy;
use crate::ledger::Ledger;
use crate::models::{
    Category, PrioritizedProblem, PriorityFactors, QuestionId, ReviewItem, ReviewPlan, Source,
    Tier, WeaknessReport, WrongAnswerRecord,
};
use crate::question_bank::QuestionBank;
use crate::scheduler::Scheduler;
use crate::stats::WeaknessSource;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Everything the prioritizer reads, captured at one instant.
#[derive(Debug, Clone, Default)]
pub struct ReviewSnapshot {
    pub now: DateTime<Utc>,
    pub due: Vec<ReviewItem>,
    /// All scheduled items, used to enrich ledger candidates.
    pub scheduled: HashMap<QuestionId, ReviewItem>,
    pub wrong: Vec<WrongAnswerRecord>,
    pub weakness: Option<WeaknessReport>,
}

impl ReviewSnapshot {
    pub fn capture(
        scheduler: &Scheduler,
        ledger: &Ledger,
        weakness: Option<&dyn WeaknessSource>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            now,
            due: scheduler.due_items(now),
            scheduled: scheduler
                .items()
                .into_iter()
                .map(|item| (item.question_id.clone(), item))
                .collect(),
            wrong: ledger.records().to_vec(),
            weakness: weakness.and_then(|source| source.weakness_report()),
        }
    }
}

pub struct Prioritizer {
    policy: PriorityPolicy,
    max_level: u8,
}

impl Prioritizer {
    pub fn new(policy: PriorityPolicy, max_level: u8) -> Self {
        Self { policy, max_level }
    }

    pub fn policy(&self) -> &PriorityPolicy {
        &self.policy
    }

    /// Ranks the snapshot. Ids unknown to `bank` are dropped when a bank is given.
    pub fn prioritize(
        &self,
        snapshot: &ReviewSnapshot,
        bank: Option<&dyn QuestionBank>,
    ) -> ReviewPlan {
        let now = snapshot.now;
        let wrong_by_id: HashMap<&str, &WrongAnswerRecord> = snapshot
            .wrong
            .iter()
            .map(|r| (r.question_id.as_str(), r))
            .collect();

        let known = |id: &str| bank.is_none_or(|bank| bank.question(id).is_some());
        let category_of = |id: &str, fallback: Option<Category>| {
            bank.and_then(|bank| bank.category_of(id)).or(fallback)
        };

        let mut candidates: Vec<(QuestionId, Source, PriorityFactors)> = Vec::new();

        // Due items from the scheduler
        for item in snapshot.due.iter().filter(|item| known(item.question_id.as_str())) {
            let record = wrong_by_id.get(item.question_id.as_str());
            let factors = PriorityFactors {
                overdue_days: Some(item.overdue_days(now)),
                wrong_count: item.wrong_count,
                days_since_wrong: item.last_failed_at().map(|at| days_between(at, now).max(0.0)),
                retention_rate: Some(item.retention_rate),
                forgetting_risk: Some(item.forgetting_risk),
                level: Some(item.level),
                category: category_of(item.question_id.as_str(), record.and_then(|r| r.category)),
            };
            candidates.push((item.question_id.clone(), Source::Scheduler, factors));
        }

        // Every open wrong-answer record
        for record in snapshot.wrong.iter().filter(|r| known(r.question_id.as_str())) {
            let category = category_of(record.question_id.as_str(), record.category);
            let factors = self.ledger_factors(record, snapshot, category);
            candidates.push((record.question_id.clone(), Source::Ledger, factors));
        }

        // A few representatives per weak category
        if let Some(report) = &snapshot.weakness {
            let weak = report.weak_categories(
                self.policy.weak_accuracy_threshold,
                self.policy.weak_min_samples,
            );
            for category in weak {
                let representatives = snapshot
                    .wrong
                    .iter()
                    .filter(|r| known(r.question_id.as_str()))
                    .filter(|r| category_of(r.question_id.as_str(), r.category) == Some(category))
                    .take(self.policy.weak_per_category);
                for record in representatives {
                    let factors = self.ledger_factors(record, snapshot, Some(category));
                    candidates.push((record.question_id.clone(), Source::WeakCategory, factors));
                }
            }
        }

        // Keep the best-scoring entry per question
        let mut merged: IndexMap<QuestionId, PrioritizedProblem> = IndexMap::new();
        for (question_id, source, factors) in candidates {
            let priority = self.score(source, &factors);
            let problem = PrioritizedProblem {
                question_id: question_id.clone(),
                source,
                priority,
                tier: self.tier(priority),
                factors,
            };
            match merged.get_mut(&question_id) {
                Some(existing) if existing.priority >= priority => {}
                Some(existing) => *existing = problem,
                None => {
                    merged.insert(question_id, problem);
                }
            }
        }

        // Stable sort, so ties keep first-seen order
        let mut problems: Vec<PrioritizedProblem> = merged.into_values().collect();
        problems.sort_by(|a, b| b.priority.total_cmp(&a.priority));
        ReviewPlan { problems }
    }

    /// Additive priority score for one candidate.
    pub fn score(&self, source: Source, factors: &PriorityFactors) -> f64 {
        let p = &self.policy;
        let mut score = 0.0;

        // Overdue scheduler items go to the top
        if source == Source::Scheduler {
            if let Some(overdue) = factors.overdue_days {
                score += p.overdue_base + overdue * p.overdue_per_day;
            }
        }
        // Memory decay
        if let Some(risk) = factors.forgetting_risk {
            score += risk * p.risk_weight;
        }
        if let Some(retention) = factors.retention_rate {
            score += (100.0 - retention) * p.retention_gap_weight;
        }
        score += factors.wrong_count as f64 * p.wrong_count_weight;

        // Recent mistakes
        match factors.days_since_wrong {
            Some(days) if days < 1.0 => score += p.wrong_within_day_bonus,
            Some(days) if days < 3.0 => score += p.wrong_within_three_days_bonus,
            _ => {}
        }

        // Low levels need more work; unscheduled questions get a flat bonus
        match factors.level {
            Some(level) => {
                let gap = self.max_level.saturating_sub(level);
                score += gap as f64 * p.level_gap_weight;
            }
            None => score += p.unseen_bonus,
        }

        if source == Source::WeakCategory {
            score += p.weak_category_bonus;
        }
        score
    }

    pub fn tier(&self, score: f64) -> Tier {
        if score >= self.policy.urgent_threshold {
            Tier::Urgent
        } else if score >= self.policy.important_threshold {
            Tier::Important
        } else {
            Tier::Recommended
        }
    }

    fn ledger_factors(
        &self,
        record: &WrongAnswerRecord,
        snapshot: &ReviewSnapshot,
        category: Option<Category>,
    ) -> PriorityFactors {
        let scheduled = snapshot.scheduled.get(&record.question_id);
        PriorityFactors {
            overdue_days: None,
            wrong_count: record.wrong_count,
            days_since_wrong: Some(days_between(record.last_wrong, snapshot.now).max(0.0)),
            retention_rate: scheduled.map(|item| item.retention_rate),
            forgetting_risk: scheduled.map(|item| item.forgetting_risk),
            level: scheduled.map(|item| item.level),
            category,
        }
    }
}
