//! Per-category answer tallies, the source of the weakness report.

use crate::database::{CATEGORY_STATS_KEY, KeyValueStore, load_json, save_json};
use crate::diagnostics::Diagnostics;
use crate::models::{Category, CategoryAccuracy, WeaknessReport};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Anything that can say how the learner is doing per category.
/// `None` means no report is available yet.
pub trait WeaknessSource {
    fn weakness_report(&self) -> Option<WeaknessReport>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTally {
    pub correct: u32,
    pub total: u32,
}

impl CategoryTally {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64 * 100.0
    }
}

pub struct CategoryStats {
    store: Arc<dyn KeyValueStore>,
    diagnostics: Diagnostics,
    tallies: IndexMap<Category, CategoryTally>,
}

impl CategoryStats {
    pub fn new(store: Arc<dyn KeyValueStore>, diagnostics: Diagnostics) -> Self {
        let tallies = load_json(store.as_ref(), CATEGORY_STATS_KEY, &diagnostics);
        Self {
            store,
            diagnostics,
            tallies,
        }
    }

    pub fn record(&mut self, category: Category, correct: bool) {
        let tally = self.tallies.entry(category).or_default();
        tally.total += 1;
        if correct {
            tally.correct += 1;
        }
        self.persist();
    }

    pub fn tally(&self, category: Category) -> CategoryTally {
        self.tallies.get(&category).copied().unwrap_or_default()
    }

    pub fn snapshot(&self) -> IndexMap<Category, CategoryTally> {
        self.tallies.clone()
    }

    pub fn replace_all(&mut self, tallies: IndexMap<Category, CategoryTally>) {
        self.tallies = tallies;
        self.persist();
    }

    fn persist(&self) {
        save_json(self.store.as_ref(), CATEGORY_STATS_KEY, &self.tallies, &self.diagnostics);
    }
}

impl WeaknessSource for CategoryStats {
    fn weakness_report(&self) -> Option<WeaknessReport> {
        if self.tallies.is_empty() {
            return None;
        }
        let by_category = self
            .tallies
            .iter()
            .map(|(category, tally)| {
                (
                    *category,
                    CategoryAccuracy {
                        accuracy: tally.accuracy(),
                        total_questions: tally.total,
                    },
                )
            })
            .collect();
        Some(WeaknessReport { by_category })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    #[test]
    fn test_no_answers_means_no_report() {
        let stats = CategoryStats::new(Arc::new(MemoryStore::new()), Diagnostics::new());
        assert!(stats.weakness_report().is_none());
    }

    #[test]
    fn test_report_accuracy() {
        let store = Arc::new(MemoryStore::new());
        let mut stats = CategoryStats::new(store.clone(), Diagnostics::new());
        stats.record(Category::Preposition, true);
        stats.record(Category::Preposition, false);
        stats.record(Category::Preposition, false);
        stats.record(Category::Preposition, false);
        stats.record(Category::Vocabulary, true);

        let report = stats.weakness_report().unwrap();
        let preposition = report.by_category[&Category::Preposition];
        assert_eq!(preposition.total_questions, 4);
        assert_eq!(preposition.accuracy, 25.0);
        assert_eq!(report.by_category[&Category::Vocabulary].accuracy, 100.0);

        let reloaded = CategoryStats::new(store, Diagnostics::new());
        assert_eq!(reloaded.tally(Category::Preposition), CategoryTally { correct: 1, total: 4 });
    }
}
