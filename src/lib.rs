pub mod clock;
pub mod config;
pub mod database;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod ledger;
pub mod models;
pub mod prioritizer;
pub mod question_bank;
pub mod scheduler;
pub mod service;
pub mod session;
pub mod stats;

pub use clock::{Clock, ManualClock, OffsetClock, SystemClock};
pub use config::{Config, PriorityPolicy, SchedulerPolicy};
pub use database::{KeyValueStore, MemoryStore, SqliteStore};
pub use diagnostics::{Diagnostics, PersistenceIssue};
pub use error::{Error, Result};
pub use ledger::{CorrectOutcome, Ledger, LedgerSort};
pub use models::{
    Category, PrioritizedProblem, Question, ReviewItem, ReviewPlan, Source, Tier,
    WrongAnswerRecord,
};
pub use prioritizer::{Prioritizer, ReviewSnapshot};
pub use question_bank::{InMemoryQuestionBank, QuestionBank};
pub use scheduler::Scheduler;
pub use service::{AnswerResult, ReviewService};
pub use session::ReviewSession;
pub use stats::{CategoryStats, WeaknessSource};
