//! Spendsight Core Library
//!
//! Transaction classification and rule engine for personal budgeting:
//! - Keyword classifiers for recurrence and (suggested) necessity
//! - Exclusion rules with AND/OR matching, sweeping and joining
//! - Recurring expense linking and expected totals
//! - 50/30/20 budget health, subscription and reduction analytics
//! - Period notes
//! - Pluggable JSON persistence
//! - Bank CSV import, spreadsheet export and sheet read-back

pub mod classify;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod insights;
pub mod keywords;
pub mod models;
pub mod notes;
pub mod pipeline;
pub mod recurring;
pub mod rules;
pub mod store;

pub use classify::{
    apply_suggested_necessity, classify, classify_batch, classify_necessity, classify_recurrence,
    suggest_necessity,
};
pub use config::Config;
pub use error::{Error, Result};
pub use export::{
    is_sheet_header, plan_incremental, read_existing_keys, read_sheet, write_notes_sheet,
    write_sheet_rows, ExportPlan,
};
pub use import::{detect_format, import_csv, parse_csv, BankFormat, ParseReport, SkippedRow};
pub use insights::{Analyzer, BudgetHealth, HealthStatus, OverallHealth};
pub use models::{DedupKey, Frequency, NecessityLevel, RecurrenceType, Transaction};
pub use notes::{PeriodKey, PeriodLabel, PeriodNote, PeriodNotes};
pub use pipeline::{notes_store, ProcessedBatch, Report, Spendsight};
pub use recurring::{
    ExpensePreview, ExpenseUpdate, FrequencyTotals, NewRecurringExpense, RecurringExpense,
    RecurringExpenseEngine,
};
pub use rules::{
    ExclusionRule, ExclusionRuleEngine, MatchPreview, RuleMatcher, RuleUpdate, SweepOutcome,
};
pub use store::{JsonFileStore, MemoryStore, Store};
