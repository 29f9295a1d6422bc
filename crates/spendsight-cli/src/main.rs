//! Spendsight CLI - Transaction classification and budget analytics
//!
//! Usage:
//!   spendsight process --file CSV         Classify, sweep and link a bank export
//!   spendsight report --file CSV          Budget health and subscription report
//!   spendsight rules add netflix          Add an exclusion rule
//!   spendsight expenses add Rent 1200     Track a recurring expense
//!   spendsight notes set --month DATE     Write a monthly note

mod cli;
mod commands;


use anyhow::{Context, Result};
use clap::Parser;
use spendsight_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = Config::load(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command {
        Commands::Rules { action } => match action {
            None | Some(RulesAction::List) => commands::cmd_rules_list(&config),
            Some(RulesAction::Add { keywords, title }) => {
                commands::cmd_rules_add(&config, &keywords, &title)
            }
            Some(RulesAction::Update {
                id,
                keywords,
                title,
                enable,
                disable,
            }) => {
                let enabled = match (enable, disable) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                };
                commands::cmd_rules_update(&config, &id, keywords, title, enabled)
            }
            Some(RulesAction::Delete { id }) => commands::cmd_rules_delete(&config, &id),
            Some(RulesAction::Join { ids, title }) => {
                commands::cmd_rules_join(&config, &ids, title.as_deref())
            }
            Some(RulesAction::Preview { file, keywords }) => {
                commands::cmd_rules_preview(&config, &file, &keywords)
            }
        },
        Commands::Expenses { action } => match action {
            None | Some(ExpensesAction::List) => commands::cmd_expenses_list(&config),
            Some(ExpensesAction::Add {
                name,
                amount,
                frequency,
                keywords,
                category,
            }) => commands::cmd_expenses_add(
                &config,
                &name,
                amount,
                &frequency,
                &keywords,
                category.as_deref(),
            ),
            Some(ExpensesAction::Delete { id }) => commands::cmd_expenses_delete(&config, &id),
            Some(ExpensesAction::Preview {
                file,
                keywords,
                limit,
            }) => commands::cmd_expenses_preview(&config, &file, &keywords, limit),
            Some(ExpensesAction::Totals) => commands::cmd_expenses_totals(&config),
        },
        Commands::Process {
            file,
            bank,
            out,
            suggest_necessity,
        } => commands::cmd_process(
            &config,
            &file,
            bank.as_deref(),
            out.as_deref(),
            suggest_necessity,
        ),
        Commands::Report {
            file,
            bank,
            since,
            json,
        } => commands::cmd_report(&config, &file, bank.as_deref(), since, json),
        Commands::Notes { action } => match action {
            None | Some(NotesAction::List) => commands::cmd_notes_list(&config),
            Some(NotesAction::Get { period }) => commands::cmd_notes_get(&config, &period),
            Some(NotesAction::Set { period, content }) => {
                commands::cmd_notes_set(&config, &period, &content)
            }
            Some(NotesAction::Delete { period }) => commands::cmd_notes_delete(&config, &period),
            Some(NotesAction::Export { out }) => commands::cmd_notes_export(&config, &out),
        },
        Commands::Export {
            file,
            since,
            existing,
            out,
        } => commands::cmd_export(&config, &file, since, existing.as_deref(), &out),
    }
}
