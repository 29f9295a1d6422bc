//! 50/30/20 budget health
//!
//! Expenses are split by necessity tag into Needs, Wants and Savings and
//! compared against the 50% / 30% / 20% targets. Unknown-tagged expenses
//! count toward the total but toward no bucket, so the three percentages can
//! sum to less than 100.

use serde::Serialize;
use tracing::debug;

use crate::models::{round_to, NecessityLevel, Transaction};

use super::types::{AnalyzerKind, HealthStatus, OverallHealth};
use super::{expense_total, percentage, Analyzer};

/// One bucket of the 50/30/20 rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketHealth {
    pub total: f64,
    /// Share of all expenses, one decimal
    pub percentage: f64,
    pub target: u8,
    pub status: HealthStatus,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub total_spending: f64,
    pub needs: BucketHealth,
    pub wants: BucketHealth,
    pub savings: BucketHealth,
    pub overall_health: OverallHealth,
    /// Sum of bucket scores (3..=9)
    pub score: u8,
}

/// Budget health result; a set without expenses has nothing to score
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BudgetHealth {
    NoExpenses,
    Report(HealthReport),
}

impl BudgetHealth {
    pub fn report(&self) -> Option<&HealthReport> {
        match self {
            BudgetHealth::Report(report) => Some(report),
            BudgetHealth::NoExpenses => None,
        }
    }
}

pub struct BudgetHealthAnalyzer;

impl Analyzer for BudgetHealthAnalyzer {
    type Output = BudgetHealth;

    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::BudgetHealth
    }

    fn analyze(&self, transactions: &[Transaction]) -> BudgetHealth {
        if !transactions.iter().any(Transaction::is_expense) {
            return BudgetHealth::NoExpenses;
        }

        let total = expense_total(transactions);
        let bucket_total = |level: NecessityLevel| {
            expense_total(transactions.iter().filter(|t| t.necessity == level))
        };

        let needs_total = bucket_total(NecessityLevel::Needs);
        let wants_total = bucket_total(NecessityLevel::Wants);
        let savings_total = bucket_total(NecessityLevel::Savings);

        let needs_pct = percentage(needs_total, total);
        let wants_pct = percentage(wants_total, total);
        let savings_pct = percentage(savings_total, total);

        let needs = bucket(needs_total, needs_pct, 50, needs_status(needs_pct), needs_message(needs_pct));
        let wants = bucket(wants_total, wants_pct, 30, wants_status(wants_pct), wants_message(wants_pct));
        let savings = bucket(
            savings_total,
            savings_pct,
            20,
            savings_status(savings_pct),
            savings_message(savings_pct),
        );

        let score = needs.status.score() + wants.status.score() + savings.status.score();
        debug!(score, "Budget health computed");

        BudgetHealth::Report(HealthReport {
            total_spending: round_to(total, 2),
            needs,
            wants,
            savings,
            overall_health: OverallHealth::from_score(score),
            score,
        })
    }
}

fn bucket(total: f64, pct: f64, target: u8, status: HealthStatus, message: &str) -> BucketHealth {
    BucketHealth {
        total: round_to(total, 2),
        percentage: round_to(pct, 1),
        target,
        status,
        message: message.to_string(),
    }
}

fn needs_status(pct: f64) -> HealthStatus {
    if pct <= 55.0 {
        HealthStatus::Good
    } else if pct <= 65.0 {
        HealthStatus::Warning
    } else {
        HealthStatus::Critical
    }
}

fn wants_status(pct: f64) -> HealthStatus {
    if pct <= 35.0 {
        HealthStatus::Good
    } else if pct <= 45.0 {
        HealthStatus::Warning
    } else {
        HealthStatus::Critical
    }
}

fn savings_status(pct: f64) -> HealthStatus {
    if pct >= 15.0 {
        HealthStatus::Good
    } else if pct >= 10.0 {
        HealthStatus::Warning
    } else {
        HealthStatus::Critical
    }
}

fn needs_message(pct: f64) -> &'static str {
    if pct <= 50.0 {
        "Excellent! Your essential spending is well controlled."
    } else if pct <= 55.0 {
        "Good, but watch for lifestyle creep in essentials."
    } else if pct <= 65.0 {
        "Your needs are taking a bigger share. Look for savings."
    } else {
        "Essential costs are high. Consider reducing fixed expenses."
    }
}

fn wants_message(pct: f64) -> &'static str {
    if pct <= 30.0 {
        "Great balance! You're disciplined with discretionary spending."
    } else if pct <= 35.0 {
        "Slightly over target. Small cuts can make a difference."
    } else if pct <= 45.0 {
        "Discretionary spending is elevated. Review subscriptions."
    } else {
        "High discretionary spending. Identify areas to cut back."
    }
}

fn savings_message(pct: f64) -> &'static str {
    if pct >= 20.0 {
        "Excellent! You're on track for financial security."
    } else if pct >= 15.0 {
        "Good progress, but try to increase savings slightly."
    } else if pct >= 10.0 {
        "Below target. Try to automate more savings."
    } else {
        "Low savings rate. Consider the 'pay yourself first' approach."
    }
}
