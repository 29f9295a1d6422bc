//! Spend broken down by classification dimension

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{round_to, Transaction};

use super::types::AnalyzerKind;
use super::{expense_total, percentage, Analyzer};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionGroup {
    /// Tag label, e.g. "Needs" or "One-time"
    pub label: String,
    pub total: f64,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionBreakdown {
    pub by_necessity: Vec<DimensionGroup>,
    pub by_recurrence: Vec<DimensionGroup>,
}

/// Groups expenses by necessity and by recurrence; `None` without expenses
pub struct DimensionAnalyzer;

impl Analyzer for DimensionAnalyzer {
    type Output = Option<DimensionBreakdown>;

    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Dimensions
    }

    fn analyze(&self, transactions: &[Transaction]) -> Option<DimensionBreakdown> {
        let expenses: Vec<&Transaction> = transactions.iter().filter(|t| t.is_expense()).collect();
        if expenses.is_empty() {
            return None;
        }

        let total = expense_total(expenses.iter().copied());

        Some(DimensionBreakdown {
            by_necessity: group_by(&expenses, total, |t| t.necessity.as_str()),
            by_recurrence: group_by(&expenses, total, |t| t.recurrence.as_str()),
        })
    }
}

fn group_by<F>(expenses: &[&Transaction], total: f64, label: F) -> Vec<DimensionGroup>
where
    F: Fn(&Transaction) -> &'static str,
{
    let mut sums: HashMap<&'static str, (f64, usize)> = HashMap::new();
    for tx in expenses {
        let entry = sums.entry(label(*tx)).or_insert((0.0, 0));
        entry.0 += tx.amount.abs();
        entry.1 += 1;
    }

    let mut groups: Vec<DimensionGroup> = sums
        .into_iter()
        .map(|(label, (sum, count))| DimensionGroup {
            label: label.to_string(),
            total: round_to(sum, 2),
            count,
            percentage: round_to(percentage(sum, total), 1),
        })
        .collect();

    groups.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.label.cmp(&b.label))
    });
    groups
}
