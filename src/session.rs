//! Review session over the top of a review plan.
//! Problems answered wrong are repeated in later rounds until every problem
//! in a round has been answered correctly.

use crate::models::PrioritizedProblem;
use crate::service::{AnswerResult, ReviewService};

pub struct ReviewSession {
    pub problems: Vec<PrioritizedProblem>,
    passed: Vec<bool>,
    pub current_round: Vec<usize>,
    pub current_index: usize,
    pub round_number: usize,
}

impl ReviewSession {
    pub fn new(problems: Vec<PrioritizedProblem>) -> Self {
        let indices: Vec<usize> = (0..problems.len()).collect();
        Self {
            passed: vec![false; problems.len()],
            problems,
            current_round: indices,
            current_index: 0,
            round_number: 1,
        }
    }

    pub fn current_problem(&self) -> Option<&PrioritizedProblem> {
        if self.is_completed() {
            return None;
        }
        self.current_round
            .get(self.current_index)
            .and_then(|&idx| self.problems.get(idx))
    }

    /// Records the answer to the current problem through `service` and moves on.
    pub fn answer_current(
        &mut self,
        service: &mut ReviewService,
        correct: bool,
        user_answer: Option<String>,
    ) -> Option<AnswerResult> {
        if self.is_completed() {
            return None;
        }
        let idx = *self.current_round.get(self.current_index)?;
        let question_id = self.problems.get(idx)?.question_id.clone();

        let result = service.record_answer(&question_id, correct, user_answer);
        self.passed[idx] = correct;
        self.advance();
        Some(result)
    }

    fn advance(&mut self) {
        if self.current_index + 1 < self.current_round.len() {
            self.current_index += 1;
        } else {
            self.start_next_round();
        }
    }

    /// Starts a new round with the problems that were answered wrong.
    /// If none remain, the session is complete.
    fn start_next_round(&mut self) {
        let failed: Vec<usize> = self
            .current_round
            .iter()
            .copied()
            .filter(|&idx| !self.passed.get(idx).copied().unwrap_or(true))
            .collect();

        if !failed.is_empty() {
            self.current_round = failed;
            self.current_index = 0;
            self.round_number += 1;
        } else {
            self.current_index = self.current_round.len();
        }
    }

    pub fn learned_count(&self) -> usize {
        self.current_round
            .iter()
            .filter(|&&idx| self.passed.get(idx).copied().unwrap_or(false))
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.current_round.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.learned_count()
    }

    pub fn is_completed(&self) -> bool {
        self.current_round.is_empty() || self.learned_count() == self.total_count()
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round {}: {} problems", self.round_number, self.total_count())
        } else {
            format!(
                "Round {} (retry): {} problems",
                self.round_number,
                self.total_count()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::Config;
    use crate::database::MemoryStore;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn service_with_wrong(ids: &[&str]) -> ReviewService {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap()));
        let mut service =
            ReviewService::new(&Config::default(), Arc::new(MemoryStore::new()), clock, None);
        for id in ids {
            service.record_answer(id, false, None);
        }
        service
    }

    #[test]
    fn test_empty_session_is_complete() {
        let session = ReviewSession::new(Vec::new());
        assert!(session.is_completed());
        assert!(session.current_problem().is_none());
    }

    #[test]
    fn test_failed_problems_repeat_in_next_round() {
        let mut service = service_with_wrong(&["Q1", "Q2"]);
        let mut session = service.start_session(None);
        assert_eq!(session.total_count(), 2);
        assert_eq!(session.phase_message(), "Round 1: 2 problems");

        let first = session.current_problem().unwrap().question_id.clone();
        session.answer_current(&mut service, true, None);
        let second = session.current_problem().unwrap().question_id.clone();
        assert_ne!(first, second);
        session.answer_current(&mut service, false, Some("B".to_string()));

        assert_eq!(session.round_number, 2);
        assert_eq!(session.total_count(), 1);
        assert_eq!(session.current_problem().unwrap().question_id, second);
        assert!(!session.is_completed());

        session.answer_current(&mut service, true, None);
        assert!(session.is_completed());
        assert!(session.answer_current(&mut service, true, None).is_none());

        assert_eq!(service.ledger().get(&second).unwrap().wrong_count, 2);
        assert_eq!(service.ledger().get(&second).unwrap().mastered_count, 1);
    }
}
