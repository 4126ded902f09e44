//! Output types of the unified prioritizer. Recomputed on every query.

use super::{Category, QuestionId};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    Scheduler,
    Ledger,
    WeakCategory,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::Scheduler => "scheduler",
            Source::Ledger => "ledger",
            Source::WeakCategory => "weak-category",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Urgent,
    Important,
    Recommended,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Urgent => "urgent",
            Tier::Important => "important",
            Tier::Recommended => "recommended",
        };
        f.write_str(name)
    }
}

/// Inputs that contributed to a score. `None` means the signal was unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityFactors {
    pub overdue_days: Option<f64>,
    pub wrong_count: u32,
    pub days_since_wrong: Option<f64>,
    pub retention_rate: Option<f64>,
    pub forgetting_risk: Option<f64>,
    pub level: Option<u8>,
    pub category: Option<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritizedProblem {
    pub question_id: QuestionId,
    pub source: Source,
    pub priority: f64,
    pub tier: Tier,
    pub factors: PriorityFactors,
}

/// Ranked, deduplicated review candidates, highest priority first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReviewPlan {
    pub problems: Vec<PrioritizedProblem>,
}

impl ReviewPlan {
    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn tier(&self, tier: Tier) -> impl Iterator<Item = &PrioritizedProblem> {
        self.problems.iter().filter(move |p| p.tier == tier)
    }

    pub fn urgent(&self) -> Vec<&PrioritizedProblem> {
        self.tier(Tier::Urgent).collect()
    }

    pub fn important(&self) -> Vec<&PrioritizedProblem> {
        self.tier(Tier::Important).collect()
    }

    pub fn recommended(&self) -> Vec<&PrioritizedProblem> {
        self.tier(Tier::Recommended).collect()
    }

    pub fn top(&self, n: usize) -> &[PrioritizedProblem] {
        &self.problems[..n.min(self.problems.len())]
    }
}
