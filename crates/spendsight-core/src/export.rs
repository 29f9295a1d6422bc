//! Spreadsheet export
//!
//! Transactions are exported as rows of a single sheet. Incremental exports
//! skip transactions whose [`DedupKey`] is already in the sheet or earlier
//! in the same batch, so re-classifying and re-exporting never duplicates a
//! row.
//!
//! The sheet is also an input: [`read_sheet`] loads it back with the
//! Necessity, Recurrence and Note columns a user may have edited by hand.
//! Period notes go to a separate sheet via [`write_notes_sheet`].

use std::collections::{BTreeMap, HashSet};
use std::io::{Read, Write};

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::{debug, warn};

use crate::error::Result;
use crate::import::{ParseReport, SkippedRow, DEFAULT_CATEGORY};
use crate::models::{DedupKey, Transaction};
use crate::notes::PeriodKey;

/// Sheet column layout
pub const SHEET_HEADERS: [&str; 9] = [
    "Transaction Date",
    "Post Date",
    "Description",
    "Amount",
    "Category",
    "Bank",
    "Necessity",
    "Recurrence",
    "Note",
];

/// Period-notes sheet column layout
pub const NOTES_SHEET_HEADERS: [&str; 4] = ["Period", "Type", "Date Range", "Analysis Notes"];

const SHEET_DATE_FORMAT: &str = "%Y-%m-%d";

/// Bank tag for sheet rows that lost theirs
const UNKNOWN_BANK: &str = "unknown";

/// Leading columns a sheet row needs before it can be read back
const MIN_SHEET_COLUMNS: usize = 6;

/// Rows to append on an incremental export
#[derive(Debug, Clone)]
pub struct ExportPlan<'a> {
    pub new_rows: Vec<&'a Transaction>,
    /// Transactions skipped as already present
    pub duplicate_count: usize,
}

/// Decide which transactions still need exporting
pub fn plan_incremental<'a>(
    existing_keys: &HashSet<DedupKey>,
    transactions: &'a [Transaction],
) -> ExportPlan<'a> {
    let mut seen = existing_keys.clone();
    let mut new_rows = Vec::new();

    for tx in transactions {
        if seen.insert(tx.dedup_key()) {
            new_rows.push(tx);
        }
    }

    let duplicate_count = transactions.len() - new_rows.len();
    debug!(
        new = new_rows.len(),
        duplicates = duplicate_count,
        "Planned incremental export"
    );
    ExportPlan {
        new_rows,
        duplicate_count,
    }
}

/// Cell values for one sheet row
pub fn sheet_row(tx: &Transaction) -> [String; 9] {
    let date = tx.date.format(SHEET_DATE_FORMAT).to_string();
    [
        date.clone(),
        // bank exports we import carry no reliable post date
        date,
        tx.description.clone(),
        format!("{:.2}", tx.amount),
        tx.category.clone(),
        tx.bank.clone(),
        tx.necessity.to_string(),
        tx.recurrence.to_string(),
        tx.note.clone().unwrap_or_default(),
    ]
}

/// Write a header row followed by one row per transaction
///
/// Returns the number of data rows written.
pub fn write_sheet_rows<'a, W, I>(writer: W, transactions: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(SHEET_HEADERS)?;

    let mut count = 0;
    for tx in transactions {
        wtr.write_record(sheet_row(tx))?;
        count += 1;
    }
    wtr.flush()?;
    Ok(count)
}

/// Read the dedup keys of a previously exported sheet
///
/// Rows too short to carry a key, or with an unreadable date or amount,
/// are ignored.
pub fn read_existing_keys<R: Read>(reader: R) -> Result<HashSet<DedupKey>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut keys = HashSet::new();
    let mut ignored = 0;

    for result in rdr.records() {
        let record = result?;
        match key_from_row(&record) {
            Some(key) => {
                keys.insert(key);
            }
            None => ignored += 1,
        }
    }

    debug!(keys = keys.len(), ignored, "Read existing sheet keys");
    Ok(keys)
}

fn key_from_row(record: &StringRecord) -> Option<DedupKey> {
    if record.len() < MIN_SHEET_COLUMNS {
        return None;
    }
    let date = NaiveDate::parse_from_str(record.get(0)?.trim(), SHEET_DATE_FORMAT).ok()?;
    let amount: f64 = record.get(3)?.trim().parse().ok()?;
    Some(DedupKey::new(date, record.get(2)?, amount, record.get(5)?))
}

/// Whether a CSV header line is the transaction sheet layout
///
/// Checked before bank detection: the sheet shares its first columns with
/// the Chase credit export but uses ISO dates.
pub fn is_sheet_header(header: &str) -> bool {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(header.trim().as_bytes());

    match rdr.records().next() {
        Some(Ok(columns)) => {
            columns.len() >= 8
                && columns
                    .iter()
                    .zip(SHEET_HEADERS)
                    .all(|(column, expected)| column.trim() == expected)
        }
        _ => false,
    }
}

/// Load transactions back from an exported sheet
///
/// Rows dated before `since` are left out. Rows with fewer than six
/// columns, an unreadable date or amount, or an unknown tag value are
/// reported in [`ParseReport::skipped`].
pub fn read_sheet<R: Read>(reader: R, since: Option<NaiveDate>) -> Result<ParseReport> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut report = ParseReport::default();
    let mut before_since = 0;

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

        match transaction_from_row(&record) {
            Ok(tx) if since.is_some_and(|start| tx.date < start) => before_since += 1,
            Ok(tx) => report.parsed.push(tx),
            Err(reason) => report.skipped.push(SkippedRow { row, reason }),
        }
    }

    if !report.skipped.is_empty() {
        warn!(
            skipped = report.skipped.len(),
            "Some sheet rows could not be loaded"
        );
    }
    debug!(
        loaded = report.parsed.len(),
        before_since, "Read exported sheet"
    );
    Ok(report)
}

fn transaction_from_row(record: &StringRecord) -> std::result::Result<Transaction, String> {
    if record.len() < MIN_SHEET_COLUMNS {
        return Err(format!(
            "Expected at least {} columns, found {}",
            MIN_SHEET_COLUMNS,
            record.len()
        ));
    }
    let cell = |idx: usize| record.get(idx).map(str::trim).unwrap_or("");
    let non_empty = |idx: usize| Some(cell(idx)).filter(|v| !v.is_empty());

    let date = NaiveDate::parse_from_str(cell(0), SHEET_DATE_FORMAT)
        .map_err(|_| format!("Unable to parse date: {}", cell(0)))?;
    let amount = match non_empty(3) {
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("Unable to parse amount: {}", raw))?,
        None => 0.0,
    };

    let mut tx = Transaction::new(
        date,
        record.get(2).unwrap_or(""),
        amount,
        non_empty(4).unwrap_or(DEFAULT_CATEGORY),
        non_empty(5).unwrap_or(UNKNOWN_BANK),
    );
    tx.necessity = cell(6).parse()?;
    tx.recurrence = cell(7).parse()?;
    tx.note = record
        .get(8)
        .filter(|note| !note.trim().is_empty())
        .map(str::to_string);
    Ok(tx)
}

/// Write the period-notes sheet, newest period first
///
/// Blank notes are left out. Returns the number of data rows written.
pub fn write_notes_sheet<W: Write>(writer: W, notes: &BTreeMap<String, String>) -> Result<usize> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(NOTES_SHEET_HEADERS)?;

    let mut count = 0;
    for (key, content) in notes.iter().rev() {
        if content.trim().is_empty() {
            continue;
        }
        let label = PeriodKey::describe(key);
        wtr.write_record([key.as_str(), label.kind, label.range.as_str(), content.as_str()])?;
        count += 1;
    }
    wtr.flush()?;

    debug!(written = count, total = notes.len(), "Wrote period notes sheet");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NecessityLevel, RecurrenceType};

    fn tx(description: &str, amount: f64, bank: &str) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            description,
            amount,
            "Entertainment",
            bank,
        )
    }

    #[test]
    fn test_plan_skips_existing_and_batch_duplicates() {
        let mut existing = HashSet::new();
        existing.insert(tx("NETFLIX.COM", -15.5, "chase").dedup_key());

        let batch = vec![
            tx("NETFLIX.COM", -15.50, "chase"),
            tx("HULU", -7.99, "chase"),
            tx("HULU", -7.99, "chase"),
            tx("HULU", -7.99, "discover"),
        ];
        let plan = plan_incremental(&existing, &batch);

        assert_eq!(plan.new_rows.len(), 2);
        assert_eq!(plan.duplicate_count, 2);
        assert_eq!(plan.new_rows[1].bank, "discover");
    }

    #[test]
    fn test_reclassified_rows_are_not_reexported() {
        let original = tx("SPOTIFY", -10.99, "chase");
        let mut existing = HashSet::new();
        existing.insert(original.dedup_key());

        let mut reclassified = original.clone();
        reclassified.category = "Music".to_string();
        reclassified.necessity = NecessityLevel::Wants;
        reclassified.recurrence = RecurrenceType::Subscription;

        let batch = [reclassified];
        let plan = plan_incremental(&existing, &batch);
        assert!(plan.new_rows.is_empty());
        assert_eq!(plan.duplicate_count, 1);
    }

    #[test]
    fn test_write_then_read_keys() {
        let mut note = tx("NETFLIX.COM", -15.5, "chase");
        note.note = Some("family, shared".to_string());
        let txs = vec![note, tx("HULU", -7.99, "discover")];

        let mut buf = Vec::new();
        let written = write_sheet_rows(&mut buf, &txs).unwrap();
        assert_eq!(written, 2);

        let text = String::from_utf8(buf.clone()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), SHEET_HEADERS.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "2024-02-01,2024-02-01,NETFLIX.COM,-15.50,Entertainment,chase,Unknown,Unknown,\"family, shared\""
        );

        let keys = read_existing_keys(buf.as_slice()).unwrap();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&txs[0].dedup_key()));
        assert!(keys.contains(&txs[1].dedup_key()));
    }

    #[test]
    fn test_read_sheet_restores_tags() {
        let mut netflix = tx("NETFLIX.COM", -15.5, "chase");
        netflix.necessity = NecessityLevel::Wants;
        netflix.recurrence = RecurrenceType::Subscription;
        netflix.note = Some("family, shared".to_string());
        let mut rent = tx("RENT", -1200.0, "chase");
        rent.necessity = NecessityLevel::Needs;
        rent.recurrence = RecurrenceType::OneTime;

        let mut buf = Vec::new();
        write_sheet_rows(&mut buf, &[netflix.clone(), rent.clone()]).unwrap();

        let report = read_sheet(buf.as_slice(), None).unwrap();
        assert!(report.skipped.is_empty());
        assert_eq!(report.parsed, vec![netflix, rent]);
    }

    #[test]
    fn test_read_sheet_since_filter() {
        let sheet = "Transaction Date,Post Date,Description,Amount,Category,Bank,Necessity,Recurrence,Note
2024-01-31,2024-01-31,OLD,-1.00,Other,chase,Needs,Unknown,
2024-02-01,2024-02-01,NEW,-2.00,,,,,";

        let since = NaiveDate::from_ymd_opt(2024, 2, 1);
        let report = read_sheet(sheet.as_bytes(), since).unwrap();
        assert_eq!(report.parsed.len(), 1);
        assert!(report.skipped.is_empty());

        let tx = &report.parsed[0];
        assert_eq!(tx.description, "NEW");
        assert_eq!(tx.category, DEFAULT_CATEGORY);
        assert_eq!(tx.bank, UNKNOWN_BANK);
        assert_eq!(tx.necessity, NecessityLevel::Unknown);
        assert_eq!(tx.note, None);
    }

    #[test]
    fn test_read_sheet_reports_bad_rows() {
        let sheet = "Transaction Date,Post Date,Description,Amount,Category,Bank,Necessity,Recurrence,Note
2024-02-01,2024-02-01,SHORT
02/01/2024,02/01/2024,US DATE,-1.00,Other,chase,,,
2024-02-01,2024-02-01,BAD TAG,-1.00,Other,chase,Luxury,,
2024-02-01,2024-02-01,NO AMOUNT,,Other,chase,,,";

        let report = read_sheet(sheet.as_bytes(), None).unwrap();
        assert_eq!(report.parsed.len(), 1);
        assert_eq!(report.parsed[0].amount, 0.0);
        assert_eq!(report.skipped.len(), 3);
        assert_eq!(report.skipped[0].row, 2);
        assert!(report.skipped[2].reason.contains("Luxury"));
    }

    #[test]
    fn test_is_sheet_header() {
        assert!(is_sheet_header(&SHEET_HEADERS.join(",")));
        assert!(!is_sheet_header(
            "Transaction Date,Post Date,Description,Category,Type,Amount,Memo"
        ));
        assert!(!is_sheet_header("Transaction Date,Post Date,Description,Amount"));
        assert!(!is_sheet_header(""));
    }

    #[test]
    fn test_notes_sheet_newest_first_skips_blank() {
        let mut notes = BTreeMap::new();
        notes.insert("monthly_2024-01".to_string(), "Holiday bills".to_string());
        notes.insert("weekly_2024-01-07".to_string(), "quiet week".to_string());
        notes.insert("monthly_2024-02".to_string(), "   ".to_string());
        notes.insert("custom".to_string(), "misc".to_string());

        let mut buf = Vec::new();
        let written = write_notes_sheet(&mut buf, &notes).unwrap();
        assert_eq!(written, 3);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Period,Type,Date Range,Analysis Notes");
        assert_eq!(lines[1], "weekly_2024-01-07,Weekly,\"Jan 07 - Jan 13, 2024\",quiet week");
        assert_eq!(lines[2], "monthly_2024-01,Monthly,January 2024,Holiday bills");
        assert_eq!(lines[3], "custom,Other,custom,misc");
    }

    #[test]
    fn test_read_ignores_short_and_bad_rows() {
        let sheet = "Transaction Date,Post Date,Description,Amount,Category,Bank
2024-02-01,2024-02-01,OK,-1.00,Other,chase
2024-02-01,2024-02-01,SHORT
02/01/2024,02/01/2024,US DATE,-1.00,Other,chase
2024-02-01,2024-02-01,BAD AMOUNT,abc,Other,chase";

        let keys = read_existing_keys(sheet.as_bytes()).unwrap();
        assert_eq!(keys.len(), 1);
    }
}
