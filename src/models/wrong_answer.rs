//! A question the learner got wrong, as tracked by the wrong-answer ledger.
use super::{Category, QuestionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub date: DateTime<Utc>,
    pub user_answer: Option<String>,
}

/// What the caller knows about a failed answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WrongAnswerDetails {
    pub user_answer: Option<String>,
    pub category: Option<Category>,
}

impl WrongAnswerDetails {
    pub fn with_answer(answer: impl Into<String>) -> Self {
        Self {
            user_answer: Some(answer.into()),
            category: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrongAnswerRecord {
    pub question_id: QuestionId,
    pub wrong_count: u32,
    /// Consecutive correct answers since the last failure.
    pub mastered_count: u32,
    pub first_wrong: DateTime<Utc>,
    pub last_wrong: DateTime<Utc>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub attempts: Vec<Attempt>,
}

impl WrongAnswerRecord {
    pub fn new(
        question_id: impl Into<String>,
        details: WrongAnswerDetails,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            question_id: question_id.into(),
            wrong_count: 1,
            mastered_count: 0,
            first_wrong: now,
            last_wrong: now,
            category: details.category,
            attempts: vec![Attempt {
                date: now,
                user_answer: details.user_answer,
            }],
        }
    }
}
