//! Processing pipeline
//!
//! [`Spendsight`] owns both engines and runs the standard pass over a batch
//! of freshly imported transactions:
//!
//! 1. classify recurrence (necessity is reset to Unknown)
//! 2. sweep out transactions matched by exclusion rules
//! 3. link recurring expenses
//!
//! The analytics in [`crate::insights`] then run over the processed batch.

use serde::Serialize;
use tracing::info;

use crate::classify::classify_batch;
use crate::config::Config;
use crate::insights::{
    Analyzer, BudgetHealth, BudgetHealthAnalyzer, DimensionAnalyzer, DimensionBreakdown,
    ReductionAdvisor, ReductionOpportunity, SubscriptionAnalyzer, SubscriptionSummary,
};
use crate::models::Transaction;
use crate::notes::PeriodNote;
use crate::recurring::{RecurringExpense, RecurringExpenseEngine};
use crate::rules::{ExclusionRule, ExclusionRuleEngine};
use crate::store::{JsonFileStore, Store};

/// Store key for each persisted collection
pub const RULES_KEY: &str = "rules";
pub const EXPENSES_KEY: &str = "expenses";
pub const NOTES_KEY: &str = "notes";

/// Output of [`Spendsight::process`]
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedBatch {
    /// Transactions left after sweeping, classified and linked
    pub transactions: Vec<Transaction>,
    /// Number removed by exclusion rules
    pub swept: usize,
    /// Links made to recurring expenses
    pub linked: usize,
}

/// Analytics bundle for a processed batch
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub budget_health: BudgetHealth,
    pub subscriptions: SubscriptionSummary,
    pub reductions: Vec<ReductionOpportunity>,
    pub dimensions: Option<DimensionBreakdown>,
}

/// Service object owning the rule and recurring-expense engines
pub struct Spendsight<R, E>
where
    R: Store<ExclusionRule>,
    E: Store<RecurringExpense>,
{
    pub rules: ExclusionRuleEngine<R>,
    pub expenses: RecurringExpenseEngine<E>,
}

impl<R, E> Spendsight<R, E>
where
    R: Store<ExclusionRule>,
    E: Store<RecurringExpense>,
{
    pub fn new(rule_store: R, expense_store: E) -> Self {
        Self {
            rules: ExclusionRuleEngine::new(rule_store),
            expenses: RecurringExpenseEngine::new(expense_store),
        }
    }

    /// Classify, sweep and link a batch
    pub fn process(&mut self, mut transactions: Vec<Transaction>) -> ProcessedBatch {
        let total = transactions.len();
        classify_batch(&mut transactions);

        let outcome = self.rules.sweep(transactions);
        let mut remaining = outcome.remaining;
        let linked = self.expenses.link_all(&mut remaining);

        info!(
            total,
            swept = outcome.swept_count,
            linked,
            "Processed transaction batch"
        );

        ProcessedBatch {
            transactions: remaining,
            swept: outcome.swept_count,
            linked,
        }
    }

    /// Same pass as [`Self::process`] without recording sweep credits
    ///
    /// Read-only commands re-read statements that were already processed;
    /// running them through here keeps rule counters and files unchanged.
    pub fn prepare(&self, mut transactions: Vec<Transaction>) -> ProcessedBatch {
        let total = transactions.len();
        classify_batch(&mut transactions);

        let mut remaining = self.rules.filter(transactions);
        let linked = self.expenses.link_all(&mut remaining);

        ProcessedBatch {
            swept: total - remaining.len(),
            transactions: remaining,
            linked,
        }
    }

    /// Run every report analyzer over already-processed transactions
    pub fn report(&self, transactions: &[Transaction]) -> Report {
        Report {
            budget_health: BudgetHealthAnalyzer.analyze(transactions),
            subscriptions: SubscriptionAnalyzer.analyze(transactions),
            reductions: ReductionAdvisor.analyze(transactions),
            dimensions: DimensionAnalyzer.analyze(transactions),
        }
    }
}

impl Spendsight<JsonFileStore<ExclusionRule>, JsonFileStore<RecurringExpense>> {
    /// Open the JSON-backed engines configured in `config`
    pub fn open(config: &Config) -> Self {
        Self::new(
            JsonFileStore::new(config.rules_path(), RULES_KEY),
            JsonFileStore::new(config.expenses_path(), EXPENSES_KEY),
        )
    }
}

/// JSON-backed store for period notes
pub fn notes_store(config: &Config) -> JsonFileStore<PeriodNote> {
    JsonFileStore::new(config.notes_path(), NOTES_KEY)
}
