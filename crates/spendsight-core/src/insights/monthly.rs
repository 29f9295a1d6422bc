//! Month-by-month income and spending

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{round_to, Transaction};

use super::types::AnalyzerKind;
use super::Analyzer;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    /// `YYYY-MM`
    pub month: String,
    pub count: usize,
    pub income: f64,
    pub spent: f64,
    pub net: f64,
    /// `net / income` as a percentage; absent for months without income
    pub savings_rate: Option<f64>,
}

/// Per-month totals, newest month first
pub struct MonthlySummaryAnalyzer;

impl Analyzer for MonthlySummaryAnalyzer {
    type Output = Vec<MonthSummary>;

    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Monthly
    }

    fn analyze(&self, transactions: &[Transaction]) -> Vec<MonthSummary> {
        // month -> (count, income, spent)
        let mut months: BTreeMap<String, (usize, f64, f64)> = BTreeMap::new();

        for tx in transactions {
            let entry = months.entry(tx.month_key()).or_insert((0, 0.0, 0.0));
            entry.0 += 1;
            if tx.is_expense() {
                entry.2 += tx.amount.abs();
            } else {
                entry.1 += tx.amount;
            }
        }

        months
            .into_iter()
            .rev()
            .map(|(month, (count, income, spent))| {
                let net = income - spent;
                MonthSummary {
                    month,
                    count,
                    income: round_to(income, 2),
                    spent: round_to(spent, 2),
                    net: round_to(net, 2),
                    savings_rate: (income > 0.0).then(|| round_to(net * 100.0 / income, 1)),
                }
            })
            .collect()
    }
}
