//! A practice question as the question bank hands it out.
use super::Category;
use serde::{Deserialize, Serialize};

pub type QuestionId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub category: Category,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub answer: Option<String>,
}

impl Question {
    pub fn new(id: impl Into<String>, category: Category) -> Self {
        Self {
            id: id.into(),
            category,
            prompt: String::new(),
            choices: Vec::new(),
            answer: None,
        }
    }
}
