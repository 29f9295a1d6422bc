//! Read-only analytics over classified transactions
//!
//! Every analyzer takes an already-classified, already-swept transaction
//! slice and produces a serializable result. None of them mutate input, and
//! all of them accept an empty slice.
//!
//! ## Analyzers
//!
//! - **Budget Health** - 50/30/20 bucket scoring
//! - **Subscriptions** - recurring subscription charges grouped by merchant
//! - **Reductions** - heuristic savings suggestions
//! - **Dimensions** - spend grouped by necessity and by recurrence
//! - **Monthly** - income, spending and savings rate per month
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spendsight_core::insights::{Analyzer, BudgetHealthAnalyzer};
//!
//! let health = BudgetHealthAnalyzer.analyze(&transactions);
//! ```

pub mod budget_health;
pub mod dimensions;
pub mod monthly;
pub mod reductions;
pub mod subscriptions;
pub mod types;

use crate::models::Transaction;

pub use budget_health::{BucketHealth, BudgetHealth, BudgetHealthAnalyzer, HealthReport};
pub use dimensions::{DimensionAnalyzer, DimensionBreakdown, DimensionGroup};
pub use monthly::{MonthSummary, MonthlySummaryAnalyzer};
pub use reductions::{ReductionAdvisor, ReductionOpportunity};
pub use subscriptions::{SubscriptionAnalyzer, SubscriptionGroup, SubscriptionSummary};
pub use types::{AnalyzerKind, HealthStatus, OverallHealth, Priority};

/// A pure analysis over a transaction set
pub trait Analyzer {
    type Output;

    /// Identifier for logging
    fn kind(&self) -> AnalyzerKind;

    fn analyze(&self, transactions: &[Transaction]) -> Self::Output;
}

/// Sum of absolute expense amounts
pub(crate) fn expense_total<'a, I>(transactions: I) -> f64
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .filter(|t| t.is_expense())
        .map(|t| t.amount.abs())
        .sum()
}

/// Share of `part` in `whole` as a percentage, 0 when `whole` is 0
pub(crate) fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part * 100.0 / whole
    } else {
        0.0
    }
}
