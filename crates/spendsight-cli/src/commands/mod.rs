//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `expenses` - Recurring expense commands (list, add, delete, preview, totals)
//! - `notes` - Period note commands (list, get, set, delete, export)
//! - `process` - Statement commands (process, report, export)
//! - `rules` - Exclusion rule commands (list, add, update, delete, join, preview)

pub mod expenses;
pub mod notes;
pub mod process;
pub mod rules;

// Re-export command functions for main.rs
pub use expenses::*;
pub use notes::*;
pub use process::*;
pub use rules::*;

use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use spendsight_core::{export, import, BankFormat, Config, SkippedRow, Spendsight, Transaction};
use tracing::warn;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Parse a bank CSV export, auto-detecting the format unless `bank` is given
pub fn read_statement(path: &Path, bank: Option<&str>) -> Result<Vec<Transaction>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    let report = match bank {
        Some(name) => {
            let format: BankFormat = name.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            import::parse_csv(file, format)?
        }
        None => import::import_csv(file)?.1,
    };

    warn_skipped(&report.skipped);
    Ok(report.parsed)
}

fn warn_skipped(skipped: &[SkippedRow]) {
    for row in skipped {
        warn!(row = row.row, reason = %row.reason, "Skipped row");
    }
}

/// Load transactions for reporting and export
///
/// JSON files are taken as already processed (`process --out`) and exported
/// sheets are read back with their hand-edited tags. Anything else is parsed
/// as a bank export and run through the pipeline without crediting rules,
/// so re-reading a statement never changes stored state. Rows dated before
/// `since` are dropped.
pub fn load_transactions(
    config: &Config,
    path: &Path,
    bank: Option<&str>,
    since: Option<NaiveDate>,
) -> Result<Vec<Transaction>> {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let mut transactions: Vec<Transaction> = if is_json {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        serde_json::from_reader(file)
            .with_context(|| format!("Invalid transaction JSON in {}", path.display()))?
    } else {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let header = content.lines().next().unwrap_or("");

        if bank.is_none() && export::is_sheet_header(header) {
            let report = export::read_sheet(content.as_bytes(), since)?;
            warn_skipped(&report.skipped);
            return Ok(report.parsed);
        }

        let parsed = read_statement(path, bank)?;
        Spendsight::open(config).prepare(parsed).transactions
    };

    if let Some(start) = since {
        transactions.retain(|tx| tx.date >= start);
    }
    Ok(transactions)
}
