//! CSV import for supported bank exports
//!
//! Formats are recognized by header columns:
//!
//! | Format        | Required columns                                    |
//! |---------------|-----------------------------------------------------|
//! | Chase credit  | Transaction Date, Post Date, Description, Amount    |
//! | Chase debit   | Posting Date, Description, Amount, Balance          |
//! | Discover      | Trans. Date, Description, Amount                    |
//!
//! Rows that cannot be parsed are reported in [`ParseReport::skipped`]
//! rather than failing the whole file.

use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::Transaction;

/// Category assigned when the export has none
pub const DEFAULT_CATEGORY: &str = "Other";

/// Supported bank CSV layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BankFormat {
    ChaseCredit,
    ChaseDebit,
    Discover,
}

impl BankFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            BankFormat::ChaseCredit => "chase_credit",
            BankFormat::ChaseDebit => "chase_debit",
            BankFormat::Discover => "discover",
        }
    }

    /// Origin tag stored on imported transactions
    pub fn bank_tag(&self) -> &'static str {
        match self {
            BankFormat::ChaseCredit | BankFormat::ChaseDebit => "chase",
            BankFormat::Discover => "discover",
        }
    }

    fn date_column(&self) -> &'static str {
        match self {
            BankFormat::ChaseCredit => "Transaction Date",
            BankFormat::ChaseDebit => "Posting Date",
            BankFormat::Discover => "Trans. Date",
        }
    }

    /// Discover exports charges as positive numbers
    fn negates_amount(&self) -> bool {
        matches!(self, BankFormat::Discover)
    }
}

impl std::fmt::Display for BankFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BankFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "chase_credit" | "chase" => Ok(BankFormat::ChaseCredit),
            "chase_debit" => Ok(BankFormat::ChaseDebit),
            "discover" => Ok(BankFormat::Discover),
            _ => Err(format!("Unknown bank format: {}", s)),
        }
    }
}

/// A data row that was not imported
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    /// 1-based line number in the file
    pub row: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseReport {
    pub parsed: Vec<Transaction>,
    pub skipped: Vec<SkippedRow>,
}

/// Detect the bank format from a CSV header line
///
/// Returns None if the format is not recognized.
pub fn detect_format(header: &str) -> Option<BankFormat> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(header.trim().as_bytes());

    let record = rdr.records().next()?.ok()?;
    detect_from_columns(&record)
}

fn detect_from_columns(columns: &StringRecord) -> Option<BankFormat> {
    let has_all = |required: &[&str]| {
        required
            .iter()
            .all(|name| columns.iter().any(|c| c.trim() == *name))
    };

    // our own exported sheet shares the Chase credit columns
    if has_all(&["Necessity", "Recurrence"]) {
        return None;
    }
    if has_all(&["Transaction Date", "Post Date", "Description", "Amount"]) {
        return Some(BankFormat::ChaseCredit);
    }
    if has_all(&["Posting Date", "Description", "Amount", "Balance"]) {
        return Some(BankFormat::ChaseDebit);
    }
    if has_all(&["Trans. Date", "Description", "Amount"]) {
        return Some(BankFormat::Discover);
    }
    None
}

/// Detect the format from the file's own header and parse it
pub fn import_csv<R: Read>(reader: R) -> Result<(BankFormat, ParseReport)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let format = detect_from_columns(&headers).ok_or_else(|| {
        Error::UnsupportedFormat(headers.iter().collect::<Vec<_>>().join(","))
    })?;

    let report = parse_records(&mut rdr, &headers, format)?;
    Ok((format, report))
}

/// Parse CSV data already known to be in `format`
pub fn parse_csv<R: Read>(reader: R, format: BankFormat) -> Result<ParseReport> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    parse_records(&mut rdr, &headers, format)
}

/// Header name -> column index
struct Columns {
    date: usize,
    description: usize,
    amount: usize,
    category: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord, format: BankFormat) -> Result<Self> {
        let index: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim(), i))
            .collect();

        let require = |name: &str| {
            index.get(name).copied().ok_or_else(|| {
                Error::UnsupportedFormat(format!("{} export is missing column '{}'", format, name))
            })
        };

        Ok(Self {
            date: require(format.date_column())?,
            description: require("Description")?,
            amount: require("Amount")?,
            category: index.get("Category").copied(),
        })
    }
}

fn parse_records<R: Read>(
    rdr: &mut csv::Reader<R>,
    headers: &StringRecord,
    format: BankFormat,
) -> Result<ParseReport> {
    let columns = Columns::locate(headers, format)?;
    let mut report = ParseReport::default();

    for (i, result) in rdr.records().enumerate() {
        // header is line 1
        let fallback_line = i as u64 + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let row = e.position().map(|p| p.line()).unwrap_or(fallback_line);
                report.skipped.push(SkippedRow {
                    row,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let row = record.position().map(|p| p.line()).unwrap_or(fallback_line);

        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        match parse_row(&record, &columns, format) {
            Ok(tx) => report.parsed.push(tx),
            Err(reason) => report.skipped.push(SkippedRow { row, reason }),
        }
    }

    if !report.skipped.is_empty() {
        warn!(
            format = format.as_str(),
            skipped = report.skipped.len(),
            "Some rows could not be imported"
        );
    }
    debug!("Parsed {} {} transactions", report.parsed.len(), format);
    Ok(report)
}

fn parse_row(
    record: &StringRecord,
    columns: &Columns,
    format: BankFormat,
) -> std::result::Result<Transaction, String> {
    let field = |idx: usize, name: &str| {
        record
            .get(idx)
            .map(str::trim)
            .ok_or_else(|| format!("Missing {}", name))
    };

    let date = parse_date(field(columns.date, "date")?)?;
    let description = field(columns.description, "description")?;
    if description.is_empty() {
        return Err("Empty description".to_string());
    }

    let mut amount = parse_amount(field(columns.amount, "amount")?)?;
    if format.negates_amount() {
        amount = -amount;
    }

    let category = columns
        .category
        .and_then(|idx| record.get(idx))
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CATEGORY);

    Ok(Transaction::new(
        date,
        description,
        amount,
        category,
        format.bank_tag(),
    ))
}

/// Bank exports use `MM/DD/YYYY`
fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%m/%d/%Y").map_err(|_| format!("Unable to parse date: {}", s))
}

/// Parse an amount string, handling currency symbols and commas
fn parse_amount(s: &str) -> std::result::Result<f64, String> {
    let cleaned: String = s
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("Unable to parse amount: {}", s))
}
