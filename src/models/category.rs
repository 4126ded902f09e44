//! Grammar/skill bucket a question belongs to.
//!
//! The tag is assigned when a question is ingested and parsed exactly; there
//! is no guessing from free-text question types.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    PartsOfSpeech,
    VerbForm,
    Preposition,
    Conjunction,
    RelativeClause,
    Pronoun,
    Vocabulary,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::PartsOfSpeech,
        Category::VerbForm,
        Category::Preposition,
        Category::Conjunction,
        Category::RelativeClause,
        Category::Pronoun,
        Category::Vocabulary,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::PartsOfSpeech => "parts_of_speech",
            Category::VerbForm => "verb_form",
            Category::Preposition => "preposition",
            Category::Conjunction => "conjunction",
            Category::RelativeClause => "relative_clause",
            Category::Pronoun => "pronoun",
            Category::Vocabulary => "vocabulary",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_exact() {
        assert_eq!("verb_form".parse::<Category>().unwrap(), Category::VerbForm);
        assert!("verb".parse::<Category>().is_err());
        assert!("Verb_Form".parse::<Category>().is_err());
    }

    #[test]
    fn test_serde_tag_matches_display() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category));
        }
    }
}
