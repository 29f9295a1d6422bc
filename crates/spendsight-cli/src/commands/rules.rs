//! Exclusion rule command implementations

use std::path::Path;

use anyhow::{bail, Result};
use spendsight_core::{Config, RuleMatcher, RuleUpdate, Spendsight};

use super::{read_statement, truncate};

fn describe_matcher(matcher: &RuleMatcher) -> String {
    match matcher {
        RuleMatcher::Simple { keywords } => keywords.join(" + "),
        RuleMatcher::Joined { groups } => groups
            .iter()
            .map(|g| format!("({})", g.join(" + ")))
            .collect::<Vec<_>>()
            .join(" OR "),
    }
}

pub fn cmd_rules_list(config: &Config) -> Result<()> {
    let app = Spendsight::open(config);
    let rules = app.rules.list();

    if rules.is_empty() {
        println!("No exclusion rules yet. Add one with:");
        println!("  spendsight rules add transfer --title \"Transfers\"");
        return Ok(());
    }

    println!();
    println!("🧹 Exclusion Rules");
    println!("   ─────────────────────────────────────────────────────────────");

    for rule in rules {
        let icon = if rule.enabled { "✅" } else { "⏸️" };
        let title = if rule.title.is_empty() { "(untitled)" } else { rule.title.as_str() };
        println!(
            "   {} {:20} │ {:>5} swept │ {}",
            icon,
            truncate(title, 20),
            rule.swept_count,
            truncate(&describe_matcher(&rule.matcher), 40)
        );
        println!("      id: {}", rule.id);
    }

    Ok(())
}

pub fn cmd_rules_add(config: &Config, keywords: &[String], title: &str) -> Result<()> {
    if keywords.iter().all(|k| k.trim().is_empty()) {
        bail!("A rule needs at least one non-empty keyword");
    }

    let mut app = Spendsight::open(config);
    let rule = app.rules.add(keywords.to_vec(), title);

    println!("✅ Added rule {} ({})", rule.id, describe_matcher(&rule.matcher));
    Ok(())
}

pub fn cmd_rules_update(
    config: &Config,
    id: &str,
    keywords: Option<Vec<String>>,
    title: Option<String>,
    enabled: Option<bool>,
) -> Result<()> {
    if let Some(keywords) = &keywords {
        if keywords.iter().all(|k| k.trim().is_empty()) {
            bail!("A rule needs at least one non-empty keyword");
        }
    }

    let mut app = Spendsight::open(config);
    let update = RuleUpdate {
        keywords,
        title,
        enabled,
    };

    match app.rules.update(id, update) {
        Some(rule) => {
            println!(
                "✅ Updated rule {} ({}, {})",
                rule.id,
                describe_matcher(&rule.matcher),
                if rule.enabled { "enabled" } else { "disabled" }
            );
            Ok(())
        }
        None => bail!("Rule not found: {}", id),
    }
}

pub fn cmd_rules_delete(config: &Config, id: &str) -> Result<()> {
    let mut app = Spendsight::open(config);
    if !app.rules.delete(id) {
        bail!("Rule not found: {}", id);
    }
    println!("🗑️  Deleted rule {}", id);
    Ok(())
}

pub fn cmd_rules_join(config: &Config, ids: &[String], title: Option<&str>) -> Result<()> {
    let mut app = Spendsight::open(config);

    match app.rules.join(ids, title) {
        Some(rule) => {
            println!("🔗 Joined {} rules into \"{}\"", ids.len(), rule.title);
            println!("   {}", describe_matcher(&rule.matcher));
            println!("   id: {}", rule.id);
            Ok(())
        }
        None => bail!("Joining needs at least two existing, enabled rules"),
    }
}

pub fn cmd_rules_preview(config: &Config, file: &Path, keywords: &[String]) -> Result<()> {
    let transactions = read_statement(file, None)?;
    let app = Spendsight::open(config);
    let preview = app.rules.preview_match_count(keywords, &transactions);

    println!("🔍 {} of {} transactions would be swept", preview.count, transactions.len());
    for description in &preview.descriptions {
        println!("   • {}", description);
    }
    Ok(())
}
