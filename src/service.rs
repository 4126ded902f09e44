//! Review service: one place that owns the scheduler, the ledger and the
//! category stats, and routes each answer to all of them.

use crate::clock::Clock;
use crate::config::Config;
use crate::database::KeyValueStore;
use crate::diagnostics::Diagnostics;
use crate::export::json::Backup;
use crate::ledger::{CorrectOutcome, Ledger};
use crate::models::{ReviewItem, ReviewPlan, WrongAnswerDetails, WrongAnswerRecord};
use crate::prioritizer::{Prioritizer, ReviewSnapshot};
use crate::question_bank::QuestionBank;
use crate::scheduler::Scheduler;
use crate::session::ReviewSession;
use crate::stats::{CategoryStats, WeaknessSource};
use std::sync::Arc;
use tracing::info;

/// What one answer did to the learner's state.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerResult {
    /// Scheduler state, once the question has been missed at least once.
    pub item: Option<ReviewItem>,
    /// Ledger record after a wrong answer.
    pub wrong_record: Option<WrongAnswerRecord>,
    /// Ledger streak change after a correct answer.
    pub ledger: Option<CorrectOutcome>,
}

pub struct ReviewService {
    clock: Arc<dyn Clock>,
    bank: Option<Arc<dyn QuestionBank>>,
    diagnostics: Diagnostics,
    scheduler: Scheduler,
    ledger: Ledger,
    stats: CategoryStats,
    prioritizer: Prioritizer,
    session_size: usize,
}

impl ReviewService {
    pub fn new(
        config: &Config,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        bank: Option<Arc<dyn QuestionBank>>,
    ) -> Self {
        let diagnostics = Diagnostics::new();
        let scheduler = Scheduler::new(
            store.clone(),
            clock.clone(),
            config.scheduler.clone(),
            diagnostics.clone(),
        );
        let ledger = Ledger::new(
            store.clone(),
            clock.clone(),
            config.scheduler.mastery_threshold,
            diagnostics.clone(),
        );
        let stats = CategoryStats::new(store, diagnostics.clone());
        let prioritizer = Prioritizer::new(config.priority.clone(), config.scheduler.max_level());

        Self {
            clock,
            bank,
            diagnostics,
            scheduler,
            ledger,
            stats,
            prioritizer,
            session_size: config.session.size,
        }
    }

    /// Records one answer into the ledger, the scheduler and the category stats.
    ///
    /// A question enters the schedule on its first wrong answer. Correct
    /// answers only move questions that are already scheduled.
    pub fn record_answer(
        &mut self,
        question_id: &str,
        correct: bool,
        user_answer: Option<String>,
    ) -> AnswerResult {
        let category = self.bank.as_ref().and_then(|bank| bank.category_of(question_id));

        let (wrong_record, ledger) = if correct {
            (None, Some(self.ledger.record_correct(question_id)))
        } else {
            let details = WrongAnswerDetails {
                user_answer,
                category,
            };
            (Some(self.ledger.record_wrong(question_id, details)), None)
        };

        let item = if !correct || self.scheduler.contains(question_id) {
            Some(self.scheduler.record_review(question_id, correct))
        } else {
            None
        };
        if let Some(category) = category {
            self.stats.record(category, correct);
        }

        AnswerResult {
            item,
            wrong_record,
            ledger,
        }
    }

    /// Ranks everything worth reviewing right now.
    pub fn review_plan(&self) -> ReviewPlan {
        let snapshot = ReviewSnapshot::capture(
            &self.scheduler,
            &self.ledger,
            Some(&self.stats as &dyn WeaknessSource),
            self.clock.now(),
        );
        self.prioritizer.prioritize(&snapshot, self.bank.as_deref())
    }

    /// Starts a session over the top `limit` problems (config default if `None`).
    pub fn start_session(&self, limit: Option<usize>) -> ReviewSession {
        let plan = self.review_plan();
        let limit = limit.unwrap_or(self.session_size);
        ReviewSession::new(plan.top(limit).to_vec())
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn stats(&self) -> &CategoryStats {
        &self.stats
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn backup(&self) -> Backup {
        Backup::new(
            self.clock.now(),
            self.scheduler.snapshot(),
            self.ledger.records().to_vec(),
            self.stats.snapshot(),
        )
    }

    /// Replaces all learner state with the backup's contents.
    pub fn restore(&mut self, backup: Backup) {
        info!(
            scheduled = backup.review_schedule.len(),
            wrong = backup.wrong_answers.len(),
            "restoring backup"
        );
        self.scheduler.replace_all(backup.review_schedule);
        self.ledger.replace_all(backup.wrong_answers);
        self.stats.replace_all(backup.category_stats);
    }
}
