//! Recurring expense command implementations

use std::path::Path;

use anyhow::{anyhow, bail, Result};
use spendsight_core::{Config, Frequency, NewRecurringExpense, Spendsight};

use super::{read_statement, truncate};

pub fn cmd_expenses_list(config: &Config) -> Result<()> {
    let app = Spendsight::open(config);
    let expenses = app.expenses.list();

    if expenses.is_empty() {
        println!("No recurring expenses yet. Add one with:");
        println!("  spendsight expenses add Rent 1200 --keywords \"property mgmt\"");
        return Ok(());
    }

    println!();
    println!("🔁 Recurring Expenses");
    println!("   ─────────────────────────────────────────────────────────────");

    for expense in expenses {
        let icon = if expense.enabled { "✅" } else { "⏸️" };
        println!(
            "   {} {:20} │ {:>9} {:<7} │ {:12} │ {}",
            icon,
            truncate(&expense.name, 20),
            format!("${:.2}", expense.amount),
            expense.frequency,
            truncate(&expense.category, 12),
            expense.keywords.join(", ")
        );
        println!("      id: {}", expense.id);
    }

    Ok(())
}

pub fn cmd_expenses_add(
    config: &Config,
    name: &str,
    amount: f64,
    frequency: &str,
    keywords: &[String],
    category: Option<&str>,
) -> Result<()> {
    let frequency: Frequency = frequency.parse().map_err(|e: String| anyhow!(e))?;
    if !amount.is_finite() || amount < 0.0 {
        bail!("Amount must be a positive number");
    }

    let mut new = NewRecurringExpense::new(name, amount, frequency).keywords(keywords);
    if let Some(category) = category {
        new = new.category(category);
    }

    let mut app = Spendsight::open(config);
    let expense = app.expenses.add(new);

    println!("✅ Added {} (${:.2} {})", expense.name, expense.amount, expense.frequency);
    if expense.keywords.is_empty() {
        println!("   No keywords: this expense will not link to any transactions");
    }
    println!("   id: {}", expense.id);
    Ok(())
}

pub fn cmd_expenses_delete(config: &Config, id: &str) -> Result<()> {
    let mut app = Spendsight::open(config);
    if !app.expenses.delete(id) {
        bail!("Recurring expense not found: {}", id);
    }
    println!("🗑️  Deleted recurring expense {}", id);
    Ok(())
}

pub fn cmd_expenses_preview(
    config: &Config,
    file: &Path,
    keywords: &[String],
    limit: usize,
) -> Result<()> {
    let transactions = read_statement(file, None)?;
    let app = Spendsight::open(config);
    let preview = app.expenses.preview_matches(keywords, &transactions, limit);

    println!("🔍 {} matching transactions", preview.count);
    for sample in &preview.samples {
        println!(
            "   {} │ {:>10} │ {}",
            sample.date,
            format!("{:.2}", sample.amount),
            truncate(&sample.description, 40)
        );
    }
    if preview.count > preview.samples.len() {
        println!("   ... and {} more", preview.count - preview.samples.len());
    }
    Ok(())
}

pub fn cmd_expenses_totals(config: &Config) -> Result<()> {
    let app = Spendsight::open(config);
    let totals = app.expenses.totals_by_frequency();

    println!();
    println!("💵 Expected Recurring Spend");
    println!("   Weekly:             ${:>10.2}", totals.weekly);
    println!("   Monthly:            ${:>10.2}", totals.monthly);
    println!("   Monthly equivalent: ${:>10.2}", totals.monthly_equivalent);
    Ok(())
}
