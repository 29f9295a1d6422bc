//! Spending reduction suggestions
//!
//! Three fixed heuristics, each producing at most one opportunity:
//! many subscriptions, heavy dining out, and entertainment spend.

use serde::Serialize;

use crate::keywords::contains_any;
use crate::models::{round_to, RecurrenceType, Transaction};

use super::types::{AnalyzerKind, Priority};
use super::Analyzer;

/// More distinct subscriptions than this triggers a review suggestion
const SUBSCRIPTION_COUNT_THRESHOLD: usize = 3;
const DINING_THRESHOLD: f64 = 200.0;
const ENTERTAINMENT_THRESHOLD: f64 = 100.0;

const DINING_CATEGORIES: &[&str] = &["restaurant", "dining"];
const DINING_KEYWORDS: &[&str] = &["restaurant", "cafe", "doordash", "uber eats", "grubhub"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReductionOpportunity {
    pub category: String,
    /// Current spend in this area
    pub current: f64,
    pub potential_savings: f64,
    pub suggestion: String,
    pub priority: Priority,
}

impl ReductionOpportunity {
    fn new(category: &str, current: f64, rate: f64, suggestion: &str, priority: Priority) -> Self {
        Self {
            category: category.to_string(),
            current: round_to(current, 2),
            potential_savings: round_to(current * rate, 2),
            suggestion: suggestion.to_string(),
            priority,
        }
    }
}

pub struct ReductionAdvisor;

impl Analyzer for ReductionAdvisor {
    type Output = Vec<ReductionOpportunity>;

    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Reductions
    }

    fn analyze(&self, transactions: &[Transaction]) -> Vec<ReductionOpportunity> {
        let expenses: Vec<&Transaction> = transactions.iter().filter(|t| t.is_expense()).collect();
        let mut opportunities = Vec::new();

        let subscriptions: Vec<&Transaction> = expenses
            .iter()
            .copied()
            .filter(|t| t.recurrence == RecurrenceType::Subscription)
            .collect();
        let mut distinct: Vec<&str> = subscriptions.iter().map(|t| t.description.as_str()).collect();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() > SUBSCRIPTION_COUNT_THRESHOLD {
            opportunities.push(ReductionOpportunity::new(
                "Subscriptions",
                abs_sum(&subscriptions),
                0.3,
                "Review and cancel unused subscriptions",
                Priority::High,
            ));
        }

        let dining: Vec<&Transaction> = expenses.iter().copied().filter(|t| is_dining(t)).collect();
        let dining_total = abs_sum(&dining);
        if dining_total > DINING_THRESHOLD {
            opportunities.push(ReductionOpportunity::new(
                "Dining Out",
                dining_total,
                0.5,
                "Cook more meals at home",
                Priority::High,
            ));
        }

        let entertainment: Vec<&Transaction> = expenses
            .iter()
            .copied()
            .filter(|t| t.category.to_lowercase().contains("entertainment"))
            .collect();
        let entertainment_total = abs_sum(&entertainment);
        if entertainment_total > ENTERTAINMENT_THRESHOLD {
            opportunities.push(ReductionOpportunity::new(
                "Entertainment",
                entertainment_total,
                0.25,
                "Look for free or low-cost entertainment alternatives",
                Priority::Low,
            ));
        }

        // stable: ties keep the order above
        opportunities.sort_by(|a, b| b.potential_savings.total_cmp(&a.potential_savings));
        opportunities
    }
}

fn is_dining(tx: &Transaction) -> bool {
    contains_any(&tx.category.to_lowercase(), DINING_CATEGORIES)
        || contains_any(&tx.description.to_lowercase(), DINING_KEYWORDS)
}

fn abs_sum(transactions: &[&Transaction]) -> f64 {
    transactions.iter().map(|t| t.amount.abs()).sum()
}
