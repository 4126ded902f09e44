//! Configuration for the review core.
//!
//! Loaded from TOML. Every section and field has a default, so an empty or
//! missing file gives the stock behaviour.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "toeic-review";

/// Longest review interval a config may set, about a hundred years.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub scheduler: SchedulerPolicy,
    #[serde(default)]
    pub priority: PriorityPolicy,
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Reads `path`, or the platform config file when `path` is `None`.
    /// A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path.map(Path::to_path_buf).or_else(Self::config_path) {
            Some(path) => path,
            None => return Ok(Self::default()),
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.scheduler.validate()?;
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", APP_NAME)
            .map(|d| d.config_dir().join("config.toml"))
    }

    pub fn default_db_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", APP_NAME).map(|d| d.data_dir().join("review.db"))
    }

    /// The configured database path, falling back to the platform data dir.
    pub fn db_path(&self) -> Option<PathBuf> {
        self.storage.db_path.clone().or_else(Self::default_db_path)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

/// Constants of the review scheduler and the wrong-answer ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerPolicy {
    /// Review delay in days, indexed by level. The last index is the top level.
    #[serde(default = "default_intervals")]
    pub intervals: Vec<u32>,
    #[serde(default = "default_decay_constant")]
    pub decay_constant: f64,
    #[serde(default = "default_failure_retention")]
    pub failure_retention: f64,
    #[serde(default = "default_failure_risk")]
    pub failure_risk: f64,
    #[serde(default = "default_wrong_penalty")]
    pub wrong_penalty: f64,
    #[serde(default = "default_wrong_penalty_cap")]
    pub wrong_penalty_cap: f64,
    /// Consecutive correct answers that evict a ledger record.
    #[serde(default = "default_mastery_threshold")]
    pub mastery_threshold: u32,
}

fn default_intervals() -> Vec<u32> {
    vec![1, 3, 7, 14, 30, 60]
}

fn default_decay_constant() -> f64 {
    1.84
}

fn default_failure_retention() -> f64 {
    50.0
}

fn default_failure_risk() -> f64 {
    80.0
}

fn default_wrong_penalty() -> f64 {
    10.0
}

fn default_wrong_penalty_cap() -> f64 {
    50.0
}

fn default_mastery_threshold() -> u32 {
    3
}

impl Default for SchedulerPolicy {
    fn default() -> Self {
        Self {
            intervals: default_intervals(),
            decay_constant: default_decay_constant(),
            failure_retention: default_failure_retention(),
            failure_risk: default_failure_risk(),
            wrong_penalty: default_wrong_penalty(),
            wrong_penalty_cap: default_wrong_penalty_cap(),
            mastery_threshold: default_mastery_threshold(),
        }
    }
}

impl SchedulerPolicy {
    /// Rejects interval tables the date arithmetic cannot represent.
    pub fn validate(&self) -> Result<()> {
        if let Some(days) = self.intervals.iter().find(|&&d| d > MAX_INTERVAL_DAYS) {
            return Err(Error::InvalidConfig(format!(
                "interval of {} days exceeds the {} day limit",
                days, MAX_INTERVAL_DAYS
            )));
        }
        Ok(())
    }

    /// Highest reachable level. An empty table degenerates to a single level.
    pub fn max_level(&self) -> u8 {
        self.intervals.len().saturating_sub(1).min(u8::MAX as usize) as u8
    }

    /// Interval for `level`, clamped to the table. One day if the table is empty.
    pub fn interval_days(&self, level: u8) -> u32 {
        let idx = (level as usize).min(self.intervals.len().saturating_sub(1));
        self.intervals.get(idx).copied().unwrap_or(1)
    }
}

/// Weights of the additive priority score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityPolicy {
    #[serde(default = "default_overdue_base")]
    pub overdue_base: f64,
    #[serde(default = "default_overdue_per_day")]
    pub overdue_per_day: f64,
    #[serde(default = "default_risk_weight")]
    pub risk_weight: f64,
    #[serde(default = "default_retention_gap_weight")]
    pub retention_gap_weight: f64,
    #[serde(default = "default_wrong_count_weight")]
    pub wrong_count_weight: f64,
    #[serde(default = "default_wrong_within_day_bonus")]
    pub wrong_within_day_bonus: f64,
    #[serde(default = "default_wrong_within_three_days_bonus")]
    pub wrong_within_three_days_bonus: f64,
    #[serde(default = "default_level_gap_weight")]
    pub level_gap_weight: f64,
    #[serde(default = "default_unseen_bonus")]
    pub unseen_bonus: f64,
    #[serde(default = "default_weak_category_bonus")]
    pub weak_category_bonus: f64,
    #[serde(default = "default_urgent_threshold")]
    pub urgent_threshold: f64,
    #[serde(default = "default_important_threshold")]
    pub important_threshold: f64,
    #[serde(default = "default_weak_accuracy_threshold")]
    pub weak_accuracy_threshold: f64,
    #[serde(default = "default_weak_min_samples")]
    pub weak_min_samples: u32,
    #[serde(default = "default_weak_per_category")]
    pub weak_per_category: usize,
}

fn default_overdue_base() -> f64 {
    1000.0
}

fn default_overdue_per_day() -> f64 {
    50.0
}

fn default_risk_weight() -> f64 {
    5.0
}

fn default_retention_gap_weight() -> f64 {
    3.0
}

fn default_wrong_count_weight() -> f64 {
    30.0
}

fn default_wrong_within_day_bonus() -> f64 {
    100.0
}

fn default_wrong_within_three_days_bonus() -> f64 {
    50.0
}

fn default_level_gap_weight() -> f64 {
    20.0
}

fn default_unseen_bonus() -> f64 {
    100.0
}

fn default_weak_category_bonus() -> f64 {
    200.0
}

fn default_urgent_threshold() -> f64 {
    1000.0
}

fn default_important_threshold() -> f64 {
    500.0
}

fn default_weak_accuracy_threshold() -> f64 {
    50.0
}

fn default_weak_min_samples() -> u32 {
    3
}

fn default_weak_per_category() -> usize {
    5
}

impl Default for PriorityPolicy {
    fn default() -> Self {
        Self {
            overdue_base: default_overdue_base(),
            overdue_per_day: default_overdue_per_day(),
            risk_weight: default_risk_weight(),
            retention_gap_weight: default_retention_gap_weight(),
            wrong_count_weight: default_wrong_count_weight(),
            wrong_within_day_bonus: default_wrong_within_day_bonus(),
            wrong_within_three_days_bonus: default_wrong_within_three_days_bonus(),
            level_gap_weight: default_level_gap_weight(),
            unseen_bonus: default_unseen_bonus(),
            weak_category_bonus: default_weak_category_bonus(),
            urgent_threshold: default_urgent_threshold(),
            important_threshold: default_important_threshold(),
            weak_accuracy_threshold: default_weak_accuracy_threshold(),
            weak_min_samples: default_weak_min_samples(),
            weak_per_category: default_weak_per_category(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_size")]
    pub size: usize,
}

fn default_session_size() -> usize {
    20
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            size: default_session_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.scheduler.intervals, vec![1, 3, 7, 14, 30, 60]);
        assert_eq!(config.priority.overdue_base, 1000.0);
        assert_eq!(config.session.size, 20);
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_toml(
            r#"
            [priority]
            wrong_count_weight = 45.0

            [session]
            size = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.priority.wrong_count_weight, 45.0);
        assert_eq!(config.priority.risk_weight, 5.0);
        assert_eq!(config.session.size, 10);
    }

    #[test]
    fn test_malformed_toml_is_error() {
        assert!(Config::from_toml("[priority\nrisk_weight = ").is_err());
    }

    #[test]
    fn test_absurd_interval_is_rejected() {
        let err = Config::from_toml(
            r#"
            [scheduler]
            intervals = [1, 3, 4000000000]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let config = Config::from_toml("[scheduler]\nintervals = [1, 36500]").unwrap();
        assert_eq!(config.scheduler.interval_days(1), 36_500);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(dir.path().join("absent.toml").as_path())).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_interval_lookup_clamps() {
        let policy = SchedulerPolicy::default();
        assert_eq!(policy.max_level(), 5);
        assert_eq!(policy.interval_days(0), 1);
        assert_eq!(policy.interval_days(2), 7);
        assert_eq!(policy.interval_days(5), 60);
        assert_eq!(policy.interval_days(9), 60);
    }
}
