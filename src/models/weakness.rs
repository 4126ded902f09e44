use super::Category;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAccuracy {
    /// Percentage correct, 0-100.
    pub accuracy: f64,
    pub total_questions: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaknessReport {
    pub by_category: IndexMap<Category, CategoryAccuracy>,
}

impl WeaknessReport {
    /// Categories below `accuracy_threshold` with at least `min_samples` answers.
    pub fn weak_categories(&self, accuracy_threshold: f64, min_samples: u32) -> Vec<Category> {
        self.by_category
            .iter()
            .filter(|(_, stat)| {
                stat.accuracy < accuracy_threshold && stat.total_questions >= min_samples
            })
            .map(|(category, _)| *category)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weak_categories_needs_enough_samples() {
        let mut report = WeaknessReport::default();
        report.by_category.insert(
            Category::Preposition,
            CategoryAccuracy { accuracy: 30.0, total_questions: 10 },
        );
        report.by_category.insert(
            Category::Pronoun,
            CategoryAccuracy { accuracy: 0.0, total_questions: 2 },
        );
        report.by_category.insert(
            Category::Vocabulary,
            CategoryAccuracy { accuracy: 50.0, total_questions: 8 },
        );

        assert_eq!(report.weak_categories(50.0, 3), vec![Category::Preposition]);
    }
}
