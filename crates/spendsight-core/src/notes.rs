//! Free-text notes attached to a week or a month
//!
//! Keys look like `weekly_2024-01-07` (the Sunday that starts the week) or
//! `monthly_2024-01`. Any other string is accepted as a key too; the helpers
//! in [`PeriodKey`] just build the canonical forms.
//!
//! Notes are kept in a `BTreeMap`, so they are saved and listed in key
//! order regardless of when each was written.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{load_or_empty, save_or_warn, Store};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodNote {
    pub period_key: String,
    #[serde(default)]
    pub content: String,
}

/// Builders for canonical period keys
pub struct PeriodKey;

impl PeriodKey {
    /// Key for the Sunday-to-Saturday week containing `date`
    pub fn weekly(date: NaiveDate) -> String {
        let offset = date.weekday().num_days_from_sunday() as i64;
        let sunday = date - Duration::days(offset);
        format!("weekly_{}", sunday.format("%Y-%m-%d"))
    }

    pub fn monthly(date: NaiveDate) -> String {
        format!("monthly_{}", date.format("%Y-%m"))
    }

    /// Period type and readable date range for a key
    ///
    /// A canonical prefix with an unparseable date keeps the raw date text
    /// as its range; any other key is an "Other" period named by itself.
    pub fn describe(key: &str) -> PeriodLabel {
        if let Some(start) = key.strip_prefix("weekly_") {
            let range = match NaiveDate::parse_from_str(start, "%Y-%m-%d") {
                Ok(sunday) => {
                    let saturday = sunday + Duration::days(6);
                    format!("{} - {}", sunday.format("%b %d"), saturday.format("%b %d, %Y"))
                }
                Err(_) => start.to_string(),
            };
            return PeriodLabel {
                kind: "Weekly",
                range,
            };
        }

        if let Some(month) = key.strip_prefix("monthly_") {
            let range = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
                .map(|first| first.format("%B %Y").to_string())
                .unwrap_or_else(|_| month.to_string());
            return PeriodLabel {
                kind: "Monthly",
                range,
            };
        }

        PeriodLabel {
            kind: "Other",
            range: key.to_string(),
        }
    }
}

/// Display form of a period key, see [`PeriodKey::describe`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodLabel {
    /// "Weekly", "Monthly" or "Other"
    pub kind: &'static str,
    pub range: String,
}

pub struct PeriodNotes<S: Store<PeriodNote>> {
    notes: BTreeMap<String, PeriodNote>,
    store: S,
}

impl<S: Store<PeriodNote>> PeriodNotes<S> {
    pub fn new(store: S) -> Self {
        let notes = load_or_empty(&store)
            .into_iter()
            .map(|n| (n.period_key.clone(), n))
            .collect();
        Self { notes, store }
    }

    fn persist(&self) {
        let notes: Vec<PeriodNote> = self.notes.values().cloned().collect();
        save_or_warn(&self.store, &notes);
    }

    /// Note content for `key`, empty when there is none
    pub fn get(&self, key: &str) -> String {
        self.notes
            .get(key)
            .map(|n| n.content.clone())
            .unwrap_or_default()
    }

    /// Create or replace the note for `key`
    pub fn save(&mut self, key: &str, content: &str) -> PeriodNote {
        let note = PeriodNote {
            period_key: key.to_string(),
            content: content.to_string(),
        };
        self.notes.insert(key.to_string(), note.clone());
        self.persist();
        debug!(key, "Saved period note");
        note
    }

    pub fn delete(&mut self, key: &str) -> bool {
        if self.notes.remove(key).is_none() {
            return false;
        }
        self.persist();
        true
    }

    /// All notes keyed by period
    pub fn all(&self) -> BTreeMap<String, String> {
        self.notes
            .iter()
            .map(|(k, n)| (k.clone(), n.content.clone()))
            .collect()
    }
}
