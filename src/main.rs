//! Command-line front end for the TOEIC review core.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use toeic_review::clock::MAX_OFFSET_DAYS;
use toeic_review::database::CLOCK_OFFSET_KEY;
use toeic_review::export::json::{export_backup_to_path, import_backup};
use toeic_review::models::PrioritizedProblem;
use toeic_review::{
    Category, Clock, Config, InMemoryQuestionBank, KeyValueStore, LedgerSort, OffsetClock,
    QuestionBank, ReviewService, SqliteStore, WeaknessSource,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Spaced-repetition review planner for TOEIC practice
#[derive(Parser)]
#[command(name = "toeic-review")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Track answers and plan TOEIC review sessions")]
struct Cli {
    /// Config file (TOML). Defaults to the platform config dir.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file. Overrides the config.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Question bank JSON, used for categories and id validation
    #[arg(long, global = true)]
    questions: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record an answer to a question
    Answer {
        /// Question id
        id: String,
        /// Whether the answer was correct
        #[arg(value_enum)]
        outcome: AnswerOutcome,
        /// The answer the learner gave
        #[arg(long)]
        answer: Option<String>,
    },

    /// Show the prioritized review plan
    Plan {
        /// Number of problems to show
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List scheduled items that are due
    Due,

    /// List wrong-answer records
    Wrong {
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, value_enum, default_value = "stored")]
        sort: SortArg,
    },

    /// Show schedule, ledger and category statistics
    Stats,

    /// Move the simulated date forward
    AdvanceDay {
        #[arg(long, default_value = "1")]
        days: i64,
    },

    /// Export all review state to a JSON file
    Export { output: PathBuf },

    /// Replace all review state with a JSON backup
    Import { file: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum AnswerOutcome {
    Correct,
    Wrong,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Stored,
    MostWrong,
    Recent,
    Oldest,
}

impl From<SortArg> for LedgerSort {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Stored => LedgerSort::Stored,
            SortArg::MostWrong => LedgerSort::MostWrong,
            SortArg::Recent => LedgerSort::MostRecent,
            SortArg::Oldest => LedgerSort::Oldest,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let config = Config::load(cli.config.as_deref()).context("failed to load config")?;
    let db_path = cli
        .db
        .or_else(|| config.db_path())
        .context("no data directory available; pass --db")?;
    let store = Arc::new(SqliteStore::open(&db_path).context("failed to open database")?);

    let offset: i64 = store
        .get(CLOCK_OFFSET_KEY)?
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    if let Commands::AdvanceDay { days } = cli.command {
        let offset = offset
            .checked_add(days)
            .filter(|o| OffsetClock::is_valid_offset(*o))
            .with_context(|| {
                format!("simulated date must stay within {} days of today", MAX_OFFSET_DAYS)
            })?;
        store.set(CLOCK_OFFSET_KEY, &offset.to_string())?;
        let clock = OffsetClock::new(offset);
        println!("Simulated date is now {}", clock.now().format("%Y-%m-%d"));
        return Ok(());
    }

    let bank: Option<Arc<dyn QuestionBank>> = match &cli.questions {
        Some(path) => {
            let bank = InMemoryQuestionBank::load(path).context("failed to load question bank")?;
            info!(questions = bank.len(), "question bank loaded");
            Some(Arc::new(bank) as Arc<dyn QuestionBank>)
        }
        None => None,
    };

    let mut service = ReviewService::new(&config, store, Arc::new(OffsetClock::new(offset)), bank);

    match cli.command {
        Commands::Answer { id, outcome, answer } => {
            let correct = matches!(outcome, AnswerOutcome::Correct);
            let result = service.record_answer(&id, correct, answer);
            match &result.item {
                Some(item) => println!(
                    "{}: level {}, next review {}",
                    id,
                    item.level,
                    item.next_due_at
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "-".to_string())
                ),
                None => println!("{}: correct, not scheduled", id),
            }
            if let Some(record) = result.wrong_record {
                println!("  wrong {} time(s)", record.wrong_count);
            }
            if let Some(outcome) = result.ledger {
                println!("  ledger: {:?}", outcome);
            }
        }
        Commands::Plan { limit } => {
            let plan = service.review_plan();
            let limit = limit.unwrap_or(config.session.size);
            if plan.is_empty() {
                println!("Nothing to review.");
            }
            for problem in plan.top(limit) {
                print_problem(problem);
            }
            println!(
                "{} urgent, {} important, {} recommended",
                plan.urgent().len(),
                plan.important().len(),
                plan.recommended().len()
            );
        }
        Commands::Due => {
            let now = service.clock().now();
            for item in service.scheduler().due_items(now) {
                println!(
                    "{}  level {}  overdue {:.1}d  retention {:.0}%",
                    item.question_id,
                    item.level,
                    item.overdue_days(now),
                    item.retention_rate
                );
            }
        }
        Commands::Wrong { limit, sort } => {
            for record in service.ledger().get_all(limit, sort.into()) {
                println!(
                    "{}  wrong {}  streak {}  last {}",
                    record.question_id,
                    record.wrong_count,
                    record.mastered_count,
                    record.last_wrong.format("%Y-%m-%d")
                );
            }
        }
        Commands::Stats => {
            let stats = service.scheduler().stats(service.clock().now());
            println!("Scheduled: {} ({} due, {} mastered)", stats.total, stats.due, stats.mastered);
            println!("By level: {:?}", stats.by_level);
            if let Some(retention) = stats.average_retention {
                println!("Average retention: {:.1}%", retention);
            }
            println!("Wrong answers tracked: {}", service.ledger().len());
            if let Some(report) = service.stats().weakness_report() {
                for category in Category::ALL {
                    if let Some(stat) = report.by_category.get(&category) {
                        println!(
                            "  {:<16} {:>5.1}% of {}",
                            category.to_string(),
                            stat.accuracy,
                            stat.total_questions
                        );
                    }
                }
            }
        }
        Commands::Export { output } => {
            export_backup_to_path(&service.backup(), &output)?;
            println!("Exported to {}", output.display());
        }
        Commands::Import { file } => {
            let backup = import_backup(&file)?;
            service.restore(backup);
            println!("Imported {}", file.display());
        }
        Commands::AdvanceDay { .. } => {}
    }

    for issue in service.diagnostics().issues() {
        eprintln!("warning: could not {} '{}': {}", issue.op, issue.key, issue.message);
    }

    Ok(())
}

fn print_problem(problem: &PrioritizedProblem) {
    let f = &problem.factors;
    println!(
        "[{:<11}] {:<12} {:>8.1}  {:<13} wrong {}{}{}",
        problem.tier.to_string(),
        problem.question_id,
        problem.priority,
        problem.source.to_string(),
        f.wrong_count,
        f.level.map(|l| format!("  level {}", l)).unwrap_or_default(),
        f.category.map(|c| format!("  {}", c)).unwrap_or_default(),
    );
}
