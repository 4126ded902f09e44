//! Observable record of persistence failures that were absorbed.
//!
//! Review data is advisory, so a failed read or write never reaches the caller
//! of the scheduler or ledger. Every such failure is logged and also kept here
//! so it can be inspected (or asserted on in tests).

use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceOp {
    Read,
    Parse,
    Serialize,
    Write,
}

impl fmt::Display for PersistenceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PersistenceOp::Read => "read",
            PersistenceOp::Parse => "parse",
            PersistenceOp::Serialize => "serialize",
            PersistenceOp::Write => "write",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersistenceIssue {
    pub key: String,
    pub op: PersistenceOp,
    pub message: String,
}

/// Shared, cloneable sink. Clones observe the same issue list.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    issues: Arc<Mutex<Vec<PersistenceIssue>>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self, key: &str, op: PersistenceOp, message: impl Into<String>) {
        let issue = PersistenceIssue {
            key: key.to_string(),
            op,
            message: message.into(),
        };
        warn!(key = %issue.key, op = %issue.op, "persistence failure ignored: {}", issue.message);
        match self.issues.lock() {
            Ok(mut issues) => issues.push(issue),
            Err(poisoned) => poisoned.into_inner().push(issue),
        }
    }

    pub fn issues(&self) -> Vec<PersistenceIssue> {
        match self.issues.lock() {
            Ok(issues) => issues.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.issues().is_empty()
    }

    pub fn clear(&self) {
        if let Ok(mut issues) = self.issues.lock() {
            issues.clear();
        }
    }
}
