//! Wrong-answer ledger.
//!
//! Tracks questions the learner answered incorrectly, independent of the
//! scheduler. A record lives until it collects `mastery_threshold`
//! consecutive correct answers; any failure resets that streak.

use crate::clock::Clock;
use crate::database::{KeyValueStore, WRONG_ANSWERS_KEY, load_json, save_json};
use crate::diagnostics::Diagnostics;
use crate::models::{Attempt, WrongAnswerDetails, WrongAnswerRecord};
use std::sync::Arc;
use tracing::{debug, info};

/// Called with the question id when a record is evicted as mastered.
pub type MasteryListener = Box<dyn Fn(&str) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectOutcome {
    /// The question has no ledger record.
    NotTracked,
    /// Streak advanced but mastery not yet reached.
    Progress { mastered_count: u32 },
    /// Streak reached the threshold; the record was removed.
    Mastered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedgerSort {
    /// Insertion order.
    #[default]
    Stored,
    MostWrong,
    MostRecent,
    Oldest,
}

pub struct Ledger {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    diagnostics: Diagnostics,
    mastery_threshold: u32,
    records: Vec<WrongAnswerRecord>,
    listeners: Vec<MasteryListener>,
}

impl Ledger {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        mastery_threshold: u32,
        diagnostics: Diagnostics,
    ) -> Self {
        let records = load_json(store.as_ref(), WRONG_ANSWERS_KEY, &diagnostics);
        Self {
            store,
            clock,
            diagnostics,
            mastery_threshold: mastery_threshold.max(1),
            records,
            listeners: Vec::new(),
        }
    }

    pub fn on_mastered(&mut self, listener: impl Fn(&str) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn record_wrong(
        &mut self,
        question_id: &str,
        details: WrongAnswerDetails,
    ) -> WrongAnswerRecord {
        let now = self.clock.now();
        let record = match self.position(question_id) {
            Some(idx) => {
                let record = &mut self.records[idx];
                record.wrong_count += 1;
                record.mastered_count = 0;
                record.last_wrong = now;
                if details.category.is_some() {
                    record.category = details.category;
                }
                record.attempts.push(Attempt {
                    date: now,
                    user_answer: details.user_answer,
                });
                record.clone()
            }
            None => {
                let record = WrongAnswerRecord::new(question_id, details, now);
                self.records.push(record.clone());
                record
            }
        };
        debug!(question_id, wrong_count = record.wrong_count, "recorded wrong answer");
        self.persist();
        record
    }

    pub fn record_correct(&mut self, question_id: &str) -> CorrectOutcome {
        let Some(idx) = self.position(question_id) else {
            return CorrectOutcome::NotTracked;
        };

        self.records[idx].mastered_count += 1;
        let mastered_count = self.records[idx].mastered_count;

        if mastered_count >= self.mastery_threshold {
            self.records.remove(idx);
            self.persist();
            info!(question_id, "question mastered, removed from wrong-answer ledger");
            for listener in &self.listeners {
                listener(question_id);
            }
            CorrectOutcome::Mastered
        } else {
            self.persist();
            CorrectOutcome::Progress { mastered_count }
        }
    }

    pub fn get(&self, question_id: &str) -> Option<&WrongAnswerRecord> {
        self.records.iter().find(|r| r.question_id == question_id)
    }

    /// All records, sorted by `sort` and truncated to `limit` if given.
    pub fn get_all(&self, limit: Option<usize>, sort: LedgerSort) -> Vec<WrongAnswerRecord> {
        let mut records = self.records.clone();
        match sort {
            LedgerSort::Stored => {}
            LedgerSort::MostWrong => records.sort_by(|a, b| b.wrong_count.cmp(&a.wrong_count)),
            LedgerSort::MostRecent => records.sort_by(|a, b| b.last_wrong.cmp(&a.last_wrong)),
            LedgerSort::Oldest => records.sort_by(|a, b| a.first_wrong.cmp(&b.first_wrong)),
        }
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        records
    }

    pub fn records(&self) -> &[WrongAnswerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn remove(&mut self, question_id: &str) -> Option<WrongAnswerRecord> {
        let idx = self.position(question_id)?;
        let removed = self.records.remove(idx);
        self.persist();
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.persist();
    }

    /// Replaces all records and persists them.
    pub fn replace_all(&mut self, records: Vec<WrongAnswerRecord>) {
        self.records = records;
        self.persist();
    }

    fn position(&self, question_id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.question_id == question_id)
    }

    fn persist(&self) {
        save_json(self.store.as_ref(), WRONG_ANSWERS_KEY, &self.records, &self.diagnostics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::database::MemoryStore;
    use crate::models::Category;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    fn fresh() -> (Ledger, Arc<ManualClock>, Arc<MemoryStore>) {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap()));
        let store = Arc::new(MemoryStore::new());
        let ledger = Ledger::new(store.clone(), clock.clone(), 3, Diagnostics::new());
        (ledger, clock, store)
    }

    #[test]
    fn test_first_wrong_creates_record() {
        let (mut ledger, clock, _) = fresh();
        let record = ledger.record_wrong("Q1", WrongAnswerDetails::with_answer("B"));

        assert_eq!(record.wrong_count, 1);
        assert_eq!(record.mastered_count, 0);
        assert_eq!(record.first_wrong, clock.now());
        assert_eq!(record.attempts.len(), 1);
        assert_eq!(record.attempts[0].user_answer.as_deref(), Some("B"));
    }

    #[test]
    fn test_repeat_wrong_increments_and_resets_streak() {
        let (mut ledger, clock, _) = fresh();
        ledger.record_wrong("Q1", WrongAnswerDetails::default());
        ledger.record_correct("Q1");
        ledger.record_correct("Q1");
        assert_eq!(ledger.get("Q1").unwrap().mastered_count, 2);

        clock.advance_days(1);
        let record = ledger.record_wrong("Q1", WrongAnswerDetails::with_answer("C"));
        assert_eq!(record.wrong_count, 2);
        assert_eq!(record.mastered_count, 0);
        assert_eq!(record.last_wrong, clock.now());
        assert_ne!(record.first_wrong, record.last_wrong);
        assert_eq!(record.attempts.len(), 2);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_third_consecutive_correct_evicts_and_notifies() {
        let (mut ledger, _, _) = fresh();
        let mastered = Arc::new(Mutex::new(Vec::new()));
        let sink = mastered.clone();
        ledger.on_mastered(move |id| sink.lock().unwrap().push(id.to_string()));

        ledger.record_wrong("Q1", WrongAnswerDetails::default());
        assert_eq!(ledger.record_correct("Q1"), CorrectOutcome::Progress { mastered_count: 1 });
        assert_eq!(ledger.record_correct("Q1"), CorrectOutcome::Progress { mastered_count: 2 });
        assert_eq!(ledger.record_correct("Q1"), CorrectOutcome::Mastered);

        assert!(ledger.get("Q1").is_none());
        assert_eq!(*mastered.lock().unwrap(), vec!["Q1".to_string()]);
        assert_eq!(ledger.record_correct("Q1"), CorrectOutcome::NotTracked);
    }

    #[test]
    fn test_failure_after_mastery_recreates_fresh_record() {
        let (mut ledger, _, _) = fresh();
        ledger.record_wrong("Q1", WrongAnswerDetails::default());
        ledger.record_wrong("Q1", WrongAnswerDetails::default());
        for _ in 0..3 {
            ledger.record_correct("Q1");
        }

        let record = ledger.record_wrong("Q1", WrongAnswerDetails::default());
        assert_eq!(record.wrong_count, 1);
        assert_eq!(record.attempts.len(), 1);
    }

    #[test]
    fn test_get_all_sorting_and_limit() {
        let (mut ledger, clock, _) = fresh();
        ledger.record_wrong("Q1", WrongAnswerDetails::default());
        clock.advance_days(1);
        ledger.record_wrong("Q2", WrongAnswerDetails::default());
        ledger.record_wrong("Q2", WrongAnswerDetails::default());
        clock.advance_days(1);
        ledger.record_wrong("Q3", WrongAnswerDetails::default());

        let ids = |records: Vec<WrongAnswerRecord>| {
            records.into_iter().map(|r| r.question_id).collect::<Vec<_>>()
        };
        assert_eq!(ids(ledger.get_all(None, LedgerSort::Stored)), vec!["Q1", "Q2", "Q3"]);
        assert_eq!(ids(ledger.get_all(Some(1), LedgerSort::MostWrong)), vec!["Q2"]);
        assert_eq!(ids(ledger.get_all(None, LedgerSort::MostRecent)), vec!["Q3", "Q2", "Q1"]);
        assert_eq!(ids(ledger.get_all(Some(2), LedgerSort::Oldest)), vec!["Q1", "Q2"]);
    }

    #[test]
    fn test_records_persist() {
        let (mut ledger, clock, store) = fresh();
        ledger.record_wrong(
            "Q1",
            WrongAnswerDetails {
                user_answer: Some("A".to_string()),
                category: Some(Category::Preposition),
            },
        );
        ledger.record_correct("Q1");

        let reloaded = Ledger::new(store, clock, 3, Diagnostics::new());
        let record = reloaded.get("Q1").unwrap();
        assert_eq!(record.mastered_count, 1);
        assert_eq!(record.category, Some(Category::Preposition));
    }

    #[test]
    fn test_remove_and_clear() {
        let (mut ledger, _, _) = fresh();
        ledger.record_wrong("Q1", WrongAnswerDetails::default());
        ledger.record_wrong("Q2", WrongAnswerDetails::default());

        assert!(ledger.remove("Q1").is_some());
        assert!(ledger.remove("Q1").is_none());
        assert_eq!(ledger.len(), 1);

        ledger.clear();
        assert!(ledger.is_empty());
    }
}
