//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Spendsight - Classify bank transactions and check your budget health
#[derive(Parser)]
#[command(name = "spendsight")]
#[command(about = "Keyword-driven transaction classification and budget analytics", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage exclusion rules (list, add, update, delete, join, preview)
    Rules {
        #[command(subcommand)]
        action: Option<RulesAction>,
    },

    /// Manage recurring expenses (list, add, delete, preview, totals)
    Expenses {
        #[command(subcommand)]
        action: Option<ExpensesAction>,
    },

    /// Classify a bank CSV, sweep excluded rows and link recurring expenses
    Process {
        /// Bank CSV export
        #[arg(short, long)]
        file: PathBuf,

        /// Bank format (auto-detected if not specified)
        #[arg(short, long)]
        bank: Option<String>,

        /// Write processed transactions as JSON
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Fill in suggested Needs/Wants/Savings tags for untagged expenses
        #[arg(long)]
        suggest_necessity: bool,
    },

    /// Budget health, subscription and reduction report
    Report {
        /// Bank CSV export, exported sheet, or JSON written by `process --out`
        #[arg(short, long)]
        file: PathBuf,

        /// Bank format for CSV input (auto-detected if not specified)
        #[arg(short, long)]
        bank: Option<String>,

        /// Only include transactions on or after this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage weekly and monthly notes
    Notes {
        #[command(subcommand)]
        action: Option<NotesAction>,
    },

    /// Export transactions as spreadsheet rows, skipping rows already exported
    Export {
        /// Bank CSV export, exported sheet, or JSON written by `process --out`
        #[arg(short, long)]
        file: PathBuf,

        /// Only export transactions on or after this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,

        /// Previously exported sheet used for de-duplication
        #[arg(long)]
        existing: Option<PathBuf>,

        /// Output CSV path
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum RulesAction {
    /// List all rules
    List,

    /// Add a rule matching descriptions that contain every keyword
    Add {
        /// Keywords (all must match)
        #[arg(required = true)]
        keywords: Vec<String>,

        /// Display title
        #[arg(short, long, default_value = "")]
        title: String,
    },

    /// Update a rule
    Update {
        /// Rule ID
        id: String,

        /// Replace keywords (comma-separated); turns a joined rule into a simple one
        #[arg(short, long, value_delimiter = ',')]
        keywords: Option<Vec<String>>,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// Enable the rule
        #[arg(long, conflicts_with = "disable")]
        enable: bool,

        /// Disable the rule
        #[arg(long)]
        disable: bool,
    },

    /// Delete a rule
    Delete {
        /// Rule ID
        id: String,
    },

    /// Join two or more rules into one OR rule
    Join {
        /// Rule IDs
        #[arg(required = true, num_args = 2..)]
        ids: Vec<String>,

        /// Title for the joined rule
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Show which transactions in a CSV a keyword list would sweep
    Preview {
        /// Bank CSV export
        #[arg(short, long)]
        file: PathBuf,

        /// Keywords (all must match)
        #[arg(required = true)]
        keywords: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum ExpensesAction {
    /// List all recurring expenses
    List,

    /// Add a recurring expense
    Add {
        /// Display name (e.g., "Rent")
        name: String,

        /// Expected amount per period
        amount: f64,

        /// Billing frequency: weekly, monthly
        #[arg(short, long, default_value = "monthly")]
        frequency: String,

        /// Keywords that identify its transactions (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        keywords: Vec<String>,

        /// Category for display
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Delete a recurring expense
    Delete {
        /// Expense ID
        id: String,
    },

    /// Show which transactions in a CSV a keyword list would link
    Preview {
        /// Bank CSV export
        #[arg(short, long)]
        file: PathBuf,

        /// Keywords (all must match)
        #[arg(required = true)]
        keywords: Vec<String>,

        /// Maximum number of samples to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Expected totals by frequency
    Totals,
}

/// Which period a note belongs to
#[derive(Args, Debug, Clone, Default)]
pub struct PeriodArgs {
    /// Explicit key, e.g. monthly_2024-01
    #[arg(conflicts_with_all = ["week", "month"])]
    pub key: Option<String>,

    /// Week containing this date (YYYY-MM-DD)
    #[arg(long, conflicts_with = "month")]
    pub week: Option<String>,

    /// Month containing this date (YYYY-MM-DD)
    #[arg(long)]
    pub month: Option<String>,
}

#[derive(Subcommand)]
pub enum NotesAction {
    /// List all notes
    List,

    /// Show the note for a period
    Get {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Write the note for a period
    Set {
        #[command(flatten)]
        period: PeriodArgs,

        /// Note text
        #[arg(short, long)]
        content: String,
    },

    /// Delete the note for a period
    Delete {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Write all non-empty notes to a CSV sheet, newest first
    Export {
        /// Output CSV path
        #[arg(short, long)]
        out: PathBuf,
    },
}
