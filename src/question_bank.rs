//! Question bank collaborator.
//!
//! The review core only needs to resolve an id to its category; the bank
//! contents themselves are owned elsewhere.

use crate::error::Result;
use crate::models::{Category, Question};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

pub trait QuestionBank: Send + Sync {
    fn question(&self, id: &str) -> Option<Question>;

    fn category_of(&self, id: &str) -> Option<Category> {
        self.question(id).map(|q| q.category)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryQuestionBank {
    questions: IndexMap<String, Question>,
}

/// On-disk shape; the category is kept as text so one bad tag only drops
/// its own question.
#[derive(Deserialize)]
struct RawQuestion {
    id: String,
    category: String,
    #[serde(default)]
    prompt: String,
    #[serde(default)]
    choices: Vec<String>,
    #[serde(default)]
    answer: Option<String>,
}

impl InMemoryQuestionBank {
    pub fn new(questions: impl IntoIterator<Item = Question>) -> Self {
        Self {
            questions: questions.into_iter().map(|q| (q.id.clone(), q)).collect(),
        }
    }

    /// Parses a JSON array of questions. Entries with an unknown category
    /// tag are skipped with a warning.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Vec<RawQuestion> = serde_json::from_str(json)?;
        let mut questions = Vec::with_capacity(raw.len());
        for q in raw {
            match q.category.parse::<Category>() {
                Ok(category) => questions.push(Question {
                    id: q.id,
                    category,
                    prompt: q.prompt,
                    choices: q.choices,
                    answer: q.answer,
                }),
                Err(e) => warn!(question_id = %q.id, "skipping question: {}", e),
            }
        }
        Ok(Self::new(questions))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn insert(&mut self, question: Question) {
        self.questions.insert(question.id.clone(), question);
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl QuestionBank for InMemoryQuestionBank {
    fn question(&self, id: &str) -> Option<Question> {
        self.questions.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_skips_unknown_categories() {
        let bank = InMemoryQuestionBank::from_json(
            r#"[
                {"id": "Q1", "category": "preposition", "prompt": "He arrived ___ noon.",
                 "choices": ["at", "in", "on"], "answer": "at"},
                {"id": "Q2", "category": "grammar-ish"},
                {"id": "Q3", "category": "vocabulary"}
            ]"#,
        )
        .unwrap();

        assert_eq!(bank.len(), 2);
        assert_eq!(bank.category_of("Q1"), Some(Category::Preposition));
        assert_eq!(bank.question("Q1").unwrap().choices.len(), 3);
        assert!(bank.question("Q2").is_none());
        assert_eq!(bank.category_of("Q3"), Some(Category::Vocabulary));
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(InMemoryQuestionBank::from_json("{").is_err());
    }
}
