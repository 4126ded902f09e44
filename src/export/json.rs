//! JSON backup export/import.
//! Writes the persisted review state (schedule, wrong answers, category stats)
//! to a single file and reads it back.

use crate::error::Result;
use crate::models::{Category, QuestionId, ReviewItem, WrongAnswerRecord};
use crate::stats::CategoryTally;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

pub const BACKUP_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    #[serde(default)]
    pub review_schedule: IndexMap<QuestionId, ReviewItem>,
    #[serde(default)]
    pub wrong_answers: Vec<WrongAnswerRecord>,
    #[serde(default)]
    pub category_stats: IndexMap<Category, CategoryTally>,
}

impl Backup {
    pub fn new(
        exported_at: DateTime<Utc>,
        review_schedule: IndexMap<QuestionId, ReviewItem>,
        wrong_answers: Vec<WrongAnswerRecord>,
        category_stats: IndexMap<Category, CategoryTally>,
    ) -> Self {
        Self {
            version: BACKUP_VERSION,
            exported_at,
            review_schedule,
            wrong_answers,
            category_stats,
        }
    }
}

/// Exports a backup to a JSON file at the specified path.
pub fn export_backup_to_path(backup: &Backup, path: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(backup)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    info!(path = %path.display(), "backup exported");
    Ok(())
}

/// Imports a backup from a JSON file.
/// Returns an error if the file doesn't exist or contains invalid JSON.
pub fn import_backup(path: &Path) -> Result<Backup> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let backup: Backup = serde_json::from_str(&contents)?;

    info!(
        path = %path.display(),
        scheduled = backup.review_schedule.len(),
        wrong = backup.wrong_answers.len(),
        "backup imported"
    );
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;

    fn create_test_backup() -> Backup {
        let at = Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap();
        let mut schedule = IndexMap::new();
        let mut item = ReviewItem::new("Q1");
        item.level = 2;
        item.next_due_at = Some(at);
        schedule.insert("Q1".to_string(), item);

        let mut stats = IndexMap::new();
        stats.insert(Category::Pronoun, CategoryTally { correct: 2, total: 5 });

        Backup::new(
            at,
            schedule,
            vec![WrongAnswerRecord::new("Q2", Default::default(), at)],
            stats,
        )
    }

    #[test]
    fn test_export_backup_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");

        export_backup_to_path(&create_test_backup(), &path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"reviewSchedule\""));
        assert!(raw.contains("\"wrongAnswers\""));
        assert!(raw.contains("\"pronoun\""));
    }

    #[test]
    fn test_import_backup() {
        let json_content = r#"{
  "version": 1,
  "exportedAt": "2024-04-01T08:00:00Z",
  "wrongAnswers": [
    {
      "questionId": "Q7",
      "wrongCount": 2,
      "masteredCount": 1,
      "firstWrong": "2024-03-30T08:00:00Z",
      "lastWrong": "2024-03-31T08:00:00Z",
      "attempts": [{"date": "2024-03-31T08:00:00Z", "userAnswer": "C"}]
    }
  ]
}"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.json");
        fs::write(&path, json_content).unwrap();

        let backup = import_backup(&path).unwrap();
        assert!(backup.review_schedule.is_empty());
        assert_eq!(backup.wrong_answers.len(), 1);
        assert_eq!(backup.wrong_answers[0].wrong_count, 2);
        assert_eq!(backup.wrong_answers[0].category, None);
        assert_eq!(
            backup.wrong_answers[0].attempts[0].user_answer.as_deref(),
            Some("C")
        );
    }

    #[test]
    fn test_export_and_import_preserves_state() {
        let original = create_test_backup();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.json");

        export_backup_to_path(&original, &path).unwrap();
        let imported = import_backup(&path).unwrap();

        assert_eq!(original, imported);
    }

    #[test]
    fn test_import_nonexistent_file() {
        let result = import_backup(Path::new("nonexistent_file_xyz123.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_import_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        assert!(import_backup(&path).is_err());
    }
}
