//! Recurring expenses declared by the user
//!
//! A recurring expense is a known bill (rent, insurance, a gym membership)
//! with an expected amount and cadence. Its keywords are AND-matched against
//! transaction descriptions to tag the matching transactions as
//! [`RecurrenceType::Recurring`]. Expected amounts are only used for rollups;
//! transaction amounts are never touched.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::keywords::{contains_all, contains_all_lower, normalize_keywords};
use crate::models::{round_to, Frequency, RecurrenceType, Transaction};
use crate::store::{load_or_empty, save_or_warn, Store};

/// Average number of weeks in a month, used for monthly equivalents
pub const WEEKS_PER_MONTH: f64 = 4.33;

/// Default number of samples returned by a match preview
pub const DEFAULT_PREVIEW_LIMIT: usize = 10;

fn default_category() -> String {
    "Other".to_string()
}

fn default_enabled() -> bool {
    true
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpense {
    #[serde(default = "new_id")]
    pub id: String,
    /// Display name, e.g. "Rent"
    pub name: String,
    /// Expected amount per period (positive)
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_category")]
    pub category: String,
}

impl RecurringExpense {
    /// Whether `description` contains every keyword.
    ///
    /// Disabled expenses and expenses without keywords match nothing.
    pub fn matches(&self, description: &str) -> bool {
        self.enabled && !self.keywords.is_empty() && contains_all(description, &self.keywords)
    }

    fn matches_lower(&self, haystack: &str) -> bool {
        self.enabled && !self.keywords.is_empty() && contains_all_lower(haystack, &self.keywords)
    }
}

/// Input for [`RecurringExpenseEngine::add`]
#[derive(Debug, Clone)]
pub struct NewRecurringExpense {
    pub name: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub keywords: Vec<String>,
    pub category: Option<String>,
}

impl NewRecurringExpense {
    pub fn new(name: impl Into<String>, amount: f64, frequency: Frequency) -> Self {
        Self {
            name: name.into(),
            amount,
            frequency,
            keywords: Vec::new(),
            category: None,
        }
    }

    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keywords = normalize_keywords(keywords);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Partial update for [`RecurringExpenseEngine::update`]
#[derive(Debug, Clone, Default)]
pub struct ExpenseUpdate {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub frequency: Option<Frequency>,
    pub keywords: Option<Vec<String>>,
    pub enabled: Option<bool>,
    pub category: Option<String>,
}

/// Expected totals of enabled expenses
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FrequencyTotals {
    pub weekly: f64,
    pub monthly: f64,
    /// `weekly * 4.33 + monthly`
    pub monthly_equivalent: f64,
}

/// One transaction shown in a keyword preview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewSample {
    pub description: String,
    pub amount: f64,
    /// `YYYY-MM-DD`
    pub date: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExpensePreview {
    /// Total number of matches, independent of the sample limit
    pub count: usize,
    pub samples: Vec<PreviewSample>,
}

/// Owns the recurring expense collection
pub struct RecurringExpenseEngine<S: Store<RecurringExpense>> {
    expenses: Vec<RecurringExpense>,
    store: S,
}

impl<S: Store<RecurringExpense>> RecurringExpenseEngine<S> {
    pub fn new(store: S) -> Self {
        let expenses = load_or_empty(&store);
        Self { expenses, store }
    }

    fn persist(&self) {
        save_or_warn(&self.store, &self.expenses);
    }

    pub fn add(&mut self, new: NewRecurringExpense) -> RecurringExpense {
        let expense = RecurringExpense {
            id: new_id(),
            name: new.name,
            amount: new.amount,
            frequency: new.frequency,
            keywords: new.keywords,
            enabled: true,
            category: new.category.unwrap_or_else(default_category),
        };
        info!(id = %expense.id, name = %expense.name, "Added recurring expense");
        self.expenses.push(expense.clone());
        self.persist();
        expense
    }

    pub fn update(&mut self, id: &str, update: ExpenseUpdate) -> Option<RecurringExpense> {
        let expense = self.expenses.iter_mut().find(|e| e.id == id)?;

        if let Some(name) = update.name {
            expense.name = name;
        }
        if let Some(amount) = update.amount {
            expense.amount = amount;
        }
        if let Some(frequency) = update.frequency {
            expense.frequency = frequency;
        }
        if let Some(keywords) = update.keywords {
            expense.keywords = normalize_keywords(keywords);
        }
        if let Some(enabled) = update.enabled {
            expense.enabled = enabled;
        }
        if let Some(category) = update.category {
            expense.category = category;
        }

        let updated = expense.clone();
        self.persist();
        Some(updated)
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let Some(pos) = self.expenses.iter().position(|e| e.id == id) else {
            return false;
        };
        self.expenses.remove(pos);
        self.persist();
        true
    }

    pub fn get(&self, id: &str) -> Option<&RecurringExpense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    pub fn list(&self) -> &[RecurringExpense] {
        &self.expenses
    }

    /// Enabled expenses billed at `frequency`
    pub fn by_frequency(&self, frequency: Frequency) -> Vec<&RecurringExpense> {
        self.expenses
            .iter()
            .filter(|e| e.enabled && e.frequency == frequency)
            .collect()
    }

    /// Tag every transaction matched by `expense` as Recurring.
    ///
    /// Overwrites whatever recurrence the classifier assigned. Returns the
    /// number of transactions tagged.
    pub fn link_to_transactions(
        &self,
        expense: &RecurringExpense,
        transactions: &mut [Transaction],
    ) -> usize {
        let mut linked = 0;
        for tx in transactions.iter_mut() {
            if expense.matches(&tx.description) {
                tx.recurrence = RecurrenceType::Recurring;
                linked += 1;
            }
        }
        linked
    }

    /// Link every enabled expense in list order.
    ///
    /// A transaction matched by two expenses is counted twice.
    pub fn link_all(&self, transactions: &mut [Transaction]) -> usize {
        let mut total = 0;
        for tx in transactions.iter_mut() {
            let haystack = tx.description.to_lowercase();
            let hits = self
                .expenses
                .iter()
                .filter(|e| e.matches_lower(&haystack))
                .count();
            if hits > 0 {
                tx.recurrence = RecurrenceType::Recurring;
                total += hits;
            }
        }
        debug!("Linked {} transactions to recurring expenses", total);
        total
    }

    pub fn find_matching<'a>(
        &self,
        expense: &RecurringExpense,
        transactions: &'a [Transaction],
    ) -> Vec<&'a Transaction> {
        transactions
            .iter()
            .filter(|t| expense.matches(&t.description))
            .collect()
    }

    /// Expected spend per cadence over enabled expenses
    pub fn totals_by_frequency(&self) -> FrequencyTotals {
        let sum = |frequency: Frequency| -> f64 {
            self.expenses
                .iter()
                .filter(|e| e.enabled && e.frequency == frequency)
                .map(|e| e.amount)
                .sum()
        };
        let weekly = sum(Frequency::Weekly);
        let monthly = sum(Frequency::Monthly);

        FrequencyTotals {
            weekly: round_to(weekly, 2),
            monthly: round_to(monthly, 2),
            monthly_equivalent: round_to(weekly * WEEKS_PER_MONTH + monthly, 2),
        }
    }

    /// Transactions an unsaved keyword list would link
    pub fn preview_matches<K: AsRef<str>>(
        &self,
        keywords: &[K],
        transactions: &[Transaction],
        limit: usize,
    ) -> ExpensePreview {
        if keywords.is_empty() {
            return ExpensePreview::default();
        }

        let matched: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| contains_all(&t.description, keywords))
            .collect();

        ExpensePreview {
            count: matched.len(),
            samples: matched
                .into_iter()
                .take(limit)
                .map(|t| PreviewSample {
                    description: t.description.clone(),
                    amount: t.amount,
                    date: t.date.format("%Y-%m-%d").to_string(),
                    category: t.category.clone(),
                })
                .collect(),
        }
    }
}
