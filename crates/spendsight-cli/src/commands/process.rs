//! Statement command implementations (process, report, export)

use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use spendsight_core::insights::{Analyzer, MonthlySummaryAnalyzer};
use spendsight_core::{
    apply_suggested_necessity, export, BudgetHealth, Config, Report, Spendsight, Transaction,
};

use super::{load_transactions, read_statement, truncate};

pub fn cmd_process(
    config: &Config,
    file: &Path,
    bank: Option<&str>,
    out: Option<&Path>,
    suggest_necessity: bool,
) -> Result<()> {
    let parsed = read_statement(file, bank)?;
    let imported = parsed.len();

    let mut app = Spendsight::open(config);
    let mut batch = app.process(parsed);

    let suggested = if suggest_necessity {
        batch
            .transactions
            .iter_mut()
            .map(apply_suggested_necessity)
            .filter(|changed| *changed)
            .count()
    } else {
        0
    };

    println!("📥 Imported {} transactions from {}", imported, file.display());
    println!("   Swept by rules:        {}", batch.swept);
    println!("   Linked to recurring:   {}", batch.linked);
    if suggest_necessity {
        println!("   Necessity suggested:   {}", suggested);
    }
    println!("   Remaining:             {}", batch.transactions.len());

    if let Some(out) = out {
        write_json(out, &batch.transactions)?;
        println!("   Saved to {}", out.display());
    }

    Ok(())
}

fn write_json(path: &Path, transactions: &[Transaction]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), transactions)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn cmd_report(
    config: &Config,
    file: &Path,
    bank: Option<&str>,
    since: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let transactions = load_transactions(config, file, bank, since)?;
    let app = Spendsight::open(config);
    let report = app.report(&transactions);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);
    print_months(&transactions);
    Ok(())
}

fn print_report(report: &Report) {
    println!();
    println!("📊 Budget Health (50/30/20)");
    println!("   ─────────────────────────────────────────────────────────────");
    match &report.budget_health {
        BudgetHealth::NoExpenses => println!("   No expenses to analyze"),
        BudgetHealth::Report(health) => {
            println!("   Total spending: ${:.2}", health.total_spending);
            for (label, bucket) in [
                ("Needs", &health.needs),
                ("Wants", &health.wants),
                ("Savings", &health.savings),
            ] {
                println!(
                    "   {:8} ${:>10.2} │ {:>5.1}% (target {}%) │ {:8} │ {}",
                    label,
                    bucket.total,
                    bucket.percentage,
                    bucket.target,
                    bucket.status.as_str(),
                    bucket.message
                );
            }
            println!("   Overall: {} (score {}/9)", health.overall_health, health.score);
        }
    }

    let subs = &report.subscriptions;
    println!();
    println!("📋 Subscriptions");
    println!("   ─────────────────────────────────────────────────────────────");
    if subs.count == 0 {
        println!("   None found");
    } else {
        for sub in &subs.subscriptions {
            println!(
                "   {:30} │ {:>3}x │ avg ${:>8.2} │ total ${:>9.2}",
                truncate(&sub.name, 30),
                sub.occurrences,
                sub.average_amount,
                sub.total_spent
            );
        }
        println!(
            "   {} subscriptions │ ~${:.2}/month │ ~${:.2}/year",
            subs.count, subs.monthly_estimate, subs.annual_estimate
        );
    }

    println!();
    println!("💡 Reduction Opportunities");
    println!("   ─────────────────────────────────────────────────────────────");
    if report.reductions.is_empty() {
        println!("   Nothing stands out");
    }
    for op in &report.reductions {
        println!(
            "   [{}] {:15} ${:>9.2} → save ~${:.2}: {}",
            op.priority, op.category, op.current, op.potential_savings, op.suggestion
        );
    }

    if let Some(dimensions) = &report.dimensions {
        println!();
        println!("🧭 Spending by Recurrence");
        println!("   ─────────────────────────────────────────────────────────────");
        for group in &dimensions.by_recurrence {
            println!(
                "   {:14} ${:>10.2} │ {:>4} tx │ {:>5.1}%",
                group.label, group.total, group.count, group.percentage
            );
        }
    }
}

fn print_months(transactions: &[Transaction]) {
    let months = MonthlySummaryAnalyzer.analyze(transactions);
    if months.is_empty() {
        return;
    }

    println!();
    println!("📅 By Month");
    println!("   ─────────────────────────────────────────────────────────────");
    for month in months {
        let rate = month
            .savings_rate
            .map(|r| format!("{:.1}%", r))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "   {} │ in ${:>10.2} │ out ${:>10.2} │ net ${:>10.2} │ saved {}",
            month.month, month.income, month.spent, month.net, rate
        );
    }
}

pub fn cmd_export(
    config: &Config,
    file: &Path,
    since: Option<NaiveDate>,
    existing: Option<&Path>,
    out: &Path,
) -> Result<()> {
    let transactions = load_transactions(config, file, None, since)?;

    let existing_keys = match existing {
        Some(path) => {
            let sheet =
                File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
            export::read_existing_keys(sheet)?
        }
        None => HashSet::new(),
    };

    let plan = export::plan_incremental(&existing_keys, &transactions);
    let writer = File::create(out).with_context(|| format!("Failed to create {}", out.display()))?;
    let written = export::write_sheet_rows(BufWriter::new(writer), plan.new_rows.iter().copied())?;

    println!("📤 Exported {} rows to {}", written, out.display());
    if plan.duplicate_count > 0 {
        println!("   Skipped {} already-exported rows", plan.duplicate_count);
    }
    Ok(())
}
