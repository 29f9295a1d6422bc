//! Subscription summary
//!
//! Groups Subscription-tagged expenses by exact description. The monthly
//! estimate assumes each distinct subscription bills once a month at its
//! average charge.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{round_to, RecurrenceType, Transaction};

use super::types::AnalyzerKind;
use super::Analyzer;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionGroup {
    pub name: String,
    pub occurrences: usize,
    pub total_spent: f64,
    pub average_amount: f64,
    /// Category of the first charge seen
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SubscriptionSummary {
    pub total: f64,
    /// Number of distinct subscriptions
    pub count: usize,
    pub monthly_estimate: f64,
    pub annual_estimate: f64,
    /// Sorted by total spent, highest first
    pub subscriptions: Vec<SubscriptionGroup>,
}

pub struct SubscriptionAnalyzer;

impl Analyzer for SubscriptionAnalyzer {
    type Output = SubscriptionSummary;

    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Subscriptions
    }

    fn analyze(&self, transactions: &[Transaction]) -> SubscriptionSummary {
        let subscriptions: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| t.is_expense() && t.recurrence == RecurrenceType::Subscription)
            .collect();

        if subscriptions.is_empty() {
            return SubscriptionSummary::default();
        }

        // (name, category, total, count) in first-seen order
        let mut groups: Vec<(&str, &str, f64, usize)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for tx in &subscriptions {
            let slot = *index.entry(tx.description.as_str()).or_insert_with(|| {
                groups.push((tx.description.as_str(), tx.category.as_str(), 0.0, 0));
                groups.len() - 1
            });
            groups[slot].2 += tx.amount.abs();
            groups[slot].3 += 1;
        }

        let mut list: Vec<SubscriptionGroup> = groups
            .into_iter()
            .map(|(name, category, total, count)| SubscriptionGroup {
                name: name.to_string(),
                occurrences: count,
                total_spent: round_to(total, 2),
                average_amount: round_to(total / count as f64, 2),
                category: category.to_string(),
            })
            .collect();

        list.sort_by(|a, b| b.total_spent.total_cmp(&a.total_spent));

        let monthly: f64 = list.iter().map(|s| s.average_amount).sum();
        let total: f64 = subscriptions.iter().map(|t| t.amount.abs()).sum();

        SubscriptionSummary {
            total: round_to(total, 2),
            count: list.len(),
            monthly_estimate: round_to(monthly, 2),
            annual_estimate: round_to(monthly * 12.0, 2),
            subscriptions: list,
        }
    }
}
