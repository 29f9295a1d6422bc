//! Period note command implementations

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use spendsight_core::{export, notes_store, Config, PeriodKey, PeriodNotes};

use crate::cli::PeriodArgs;

/// Resolve `--week`/`--month`/explicit key into a period key
pub fn resolve_period_key(period: &PeriodArgs) -> Result<String> {
    let parse = |s: &str| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}' (use YYYY-MM-DD)", s))
    };

    if let Some(week) = &period.week {
        return Ok(PeriodKey::weekly(parse(week)?));
    }
    if let Some(month) = &period.month {
        return Ok(PeriodKey::monthly(parse(month)?));
    }
    match &period.key {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => bail!("Specify a period key, --week DATE or --month DATE"),
    }
}

pub fn cmd_notes_list(config: &Config) -> Result<()> {
    let notes = PeriodNotes::new(notes_store(config)).all();

    if notes.is_empty() {
        println!("No notes yet.");
        return Ok(());
    }

    for (key, content) in notes {
        println!("📝 {}", key);
        for line in content.lines() {
            println!("   {}", line);
        }
    }
    Ok(())
}

pub fn cmd_notes_get(config: &Config, period: &PeriodArgs) -> Result<()> {
    let key = resolve_period_key(period)?;
    let content = PeriodNotes::new(notes_store(config)).get(&key);

    if content.is_empty() {
        println!("No note for {}", key);
    } else {
        println!("📝 {}", key);
        println!("{}", content);
    }
    Ok(())
}

pub fn cmd_notes_set(config: &Config, period: &PeriodArgs, content: &str) -> Result<()> {
    let key = resolve_period_key(period)?;
    let mut notes = PeriodNotes::new(notes_store(config));
    notes.save(&key, content);
    println!("✅ Saved note for {}", key);
    Ok(())
}

pub fn cmd_notes_delete(config: &Config, period: &PeriodArgs) -> Result<()> {
    let key = resolve_period_key(period)?;
    let mut notes = PeriodNotes::new(notes_store(config));
    if !notes.delete(&key) {
        bail!("No note for {}", key);
    }
    println!("🗑️  Deleted note for {}", key);
    Ok(())
}

pub fn cmd_notes_export(config: &Config, out: &Path) -> Result<()> {
    let notes = PeriodNotes::new(notes_store(config)).all();
    let file = File::create(out).with_context(|| format!("Failed to create {}", out.display()))?;
    let written = export::write_notes_sheet(BufWriter::new(file), &notes)?;

    println!("📤 Exported {} of {} notes to {}", written, notes.len(), out.display());
    Ok(())
}
