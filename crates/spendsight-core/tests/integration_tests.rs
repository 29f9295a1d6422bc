//! Integration tests for spendsight-core
//!
//! These tests exercise the full import → classify → sweep → link → report
//! workflow against JSON-backed stores.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use spendsight_core::{
    apply_suggested_necessity, classify, classify_recurrence,
    export::{plan_incremental, read_existing_keys, read_sheet, write_sheet_rows},
    import::{import_csv, BankFormat},
    insights::{Analyzer, BudgetHealthAnalyzer, HealthStatus, OverallHealth},
    notes_store, BudgetHealth, Config, ExclusionRule, ExclusionRuleEngine, Frequency,
    JsonFileStore, MemoryStore, NecessityLevel, NewRecurringExpense, PeriodKey, PeriodNotes,
    RecurrenceType, RecurringExpense, RuleMatcher, Spendsight, Transaction,
};
use tempfile::TempDir;

fn chase_statement() -> &'static str {
    r#"Transaction Date,Post Date,Description,Category,Type,Amount,Memo
07/15/2023,07/16/2023,NETFLIX.COM,Entertainment,Sale,-15.49,
08/15/2023,08/16/2023,NETFLIX.COM,Entertainment,Sale,-15.49,
07/20/2023,07/21/2023,SPOTIFY USA,Entertainment,Sale,-10.99,
08/20/2023,08/21/2023,SPOTIFY USA,Entertainment,Sale,-10.99,
07/01/2023,07/02/2023,HULU,Entertainment,Sale,-17.99,
08/01/2023,08/02/2023,HULU,Entertainment,Sale,-17.99,
07/01/2023,07/01/2023,ABC PROPERTY MGMT RENT PAYMENT,Bills & Utilities,Sale,-1200.00,
08/01/2023,08/01/2023,ABC PROPERTY MGMT RENT PAYMENT,Bills & Utilities,Sale,-1200.00,
07/05/2023,07/05/2023,ONLINE TRANSFER TO SAVINGS,,Payment,-500.00,
07/28/2023,07/28/2023,KING SOOPERS #12,Groceries,Sale,-84.20,
07/29/2023,07/29/2023,AMC THEATERS 0451,Entertainment,Sale,-40.00,
07/31/2023,07/31/2023,PAYROLL DIRECT DEP,,Payment,3000.00,"#
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn memory_rules() -> ExclusionRuleEngine<MemoryStore<ExclusionRule>> {
    ExclusionRuleEngine::new(MemoryStore::new())
}

fn json_rules(path: &Path) -> ExclusionRuleEngine<JsonFileStore<ExclusionRule>> {
    ExclusionRuleEngine::new(JsonFileStore::new(path, "rules"))
}

fn tx(description: &str, amount: f64) -> Transaction {
    Transaction::new(date(2024, 5, 1), description, amount, "Other", "chase")
}

// =============================================================================
// Pipeline
// =============================================================================

#[test]
fn test_full_import_workflow() {
    let dir = TempDir::new().unwrap();
    let config = Config::with_data_dir(dir.path());

    let (format, parsed) = import_csv(chase_statement().as_bytes()).expect("Failed to parse CSV");
    assert_eq!(format, BankFormat::ChaseCredit);
    assert_eq!(parsed.parsed.len(), 12);
    assert!(parsed.skipped.is_empty());

    let mut app = Spendsight::open(&config);
    app.rules.add(vec!["transfer".to_string()], "Transfers");
    app.expenses.add(
        NewRecurringExpense::new("Rent", 1200.0, Frequency::Monthly)
            .keywords(["abc property"])
            .category("Housing"),
    );

    let batch = app.process(parsed.parsed);
    assert_eq!(batch.swept, 1);
    assert_eq!(batch.linked, 2);
    assert_eq!(batch.transactions.len(), 11);
    assert!(batch
        .transactions
        .iter()
        .all(|t| !t.description.contains("TRANSFER")));

    let rent: Vec<&Transaction> = batch
        .transactions
        .iter()
        .filter(|t| t.description.contains("RENT"))
        .collect();
    assert!(rent.iter().all(|t| t.recurrence == RecurrenceType::Recurring));

    let report = app.report(&batch.transactions);
    assert_eq!(report.subscriptions.count, 3);
    assert_eq!(report.subscriptions.monthly_estimate, 44.47);
    assert_eq!(report.subscriptions.annual_estimate, 533.64);
    assert_eq!(report.subscriptions.subscriptions[0].name, "HULU");

    // necessity is never auto-applied, so every bucket is empty
    let health = report.budget_health.report().expect("has expenses");
    assert_eq!(health.needs.total, 0.0);
    assert_eq!(health.savings.status, HealthStatus::Critical);
    assert_eq!(health.overall_health, OverallHealth::Good);

    assert!(report
        .reductions
        .iter()
        .any(|r| r.category == "Entertainment"));
    assert!(!report.reductions.iter().any(|r| r.category == "Subscriptions"));

    // sweep counter was persisted
    let reopened = Spendsight::open(&config);
    assert_eq!(reopened.rules.list()[0].swept_count, 1);
    assert_eq!(reopened.expenses.list()[0].category, "Housing");
}

#[test]
fn test_suggested_necessity_is_opt_in() {
    let mut app: Spendsight<MemoryStore<ExclusionRule>, MemoryStore<RecurringExpense>> =
        Spendsight::new(MemoryStore::new(), MemoryStore::new());
    let mut batch = app
        .process(vec![
            Transaction::new(date(2024, 5, 1), "KING SOOPERS", -100.0, "Groceries", "chase"),
            Transaction::new(date(2024, 5, 2), "AMC THEATERS", -60.0, "Entertainment", "chase"),
            Transaction::new(date(2024, 5, 3), "VANGUARD BUY", -40.0, "Investments", "chase"),
        ])
        .transactions;

    assert!(batch.iter().all(|t| t.necessity == NecessityLevel::Unknown));

    let changed = batch
        .iter_mut()
        .map(apply_suggested_necessity)
        .filter(|changed| *changed)
        .count();
    assert_eq!(changed, 3);

    let health = BudgetHealthAnalyzer.analyze(&batch);
    let report = health.report().unwrap();
    assert_eq!(report.needs.percentage, 50.0);
    assert_eq!(report.wants.percentage, 30.0);
    assert_eq!(report.savings.percentage, 20.0);
    assert_eq!(report.overall_health, OverallHealth::Excellent);
}

// =============================================================================
// Worked examples
// =============================================================================

#[test]
fn test_subscription_classification() {
    let mut netflix = Transaction::new(date(2024, 1, 3), "NETFLIX.COM Bill", -15.49, "Entertainment", "chase");
    classify(&mut netflix);
    assert_eq!(netflix.recurrence, RecurrenceType::Subscription);
    assert_eq!(netflix.necessity, NecessityLevel::Unknown);
}

#[test]
fn test_recurring_bill_classification() {
    assert_eq!(
        classify_recurrence("ABC Property Mgmt Rent Payment", -1200.00),
        RecurrenceType::Recurring
    );
}

#[test]
fn test_simple_rule_matching() {
    let mut engine = memory_rules();
    let coffee = engine.add(vec!["starbucks".to_string()], "");
    let gift = engine.add(vec!["starbucks".to_string(), "gift".to_string()], "");

    assert!(coffee.matches("STARBUCKS STORE #123 SEATTLE"));
    assert!(!gift.matches("STARBUCKS STORE #123 SEATTLE"));
}

#[test]
fn test_join_rules() {
    let mut engine = memory_rules();
    let a = engine.add(vec!["netflix".to_string()], "");
    let b = engine.add(vec!["hulu".to_string()], "");

    let joined = engine.join(&[a.id.clone(), b.id.clone()], None).unwrap();
    assert!(joined.matches("NETFLIX.COM"));
    assert!(joined.matches("HULU BILLING"));
    assert!(!joined.matches("SPOTIFY"));
    assert!(engine.get(&a.id).is_none());
    assert!(engine.get(&b.id).is_none());
}

#[test]
fn test_budget_health_perfect_split() {
    let mut txs = vec![tx("A", -100.0), tx("B", -60.0), tx("C", -40.0)];
    txs[0].necessity = NecessityLevel::Needs;
    txs[1].necessity = NecessityLevel::Wants;
    txs[2].necessity = NecessityLevel::Savings;

    let BudgetHealth::Report(report) = BudgetHealthAnalyzer.analyze(&txs) else {
        panic!("expected a report");
    };
    assert_eq!(
        (report.needs.percentage, report.wants.percentage, report.savings.percentage),
        (50.0, 30.0, 20.0)
    );
    assert!([&report.needs, &report.wants, &report.savings]
        .iter()
        .all(|b| b.status == HealthStatus::Good));
    assert_eq!(report.overall_health, OverallHealth::Excellent);
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_sweep_accounting() {
    let mut engine = memory_rules();
    engine.add(vec!["zelle".to_string()], "");
    engine.add(vec!["atm".to_string(), "withdrawal".to_string()], "");

    let batches = vec![
        vec![],
        vec![tx("ZELLE TO BOB", -20.0)],
        vec![tx("ATM WITHDRAWAL", -60.0), tx("ATM FEE", -3.0), tx("GROCERY", -40.0)],
        (0..50).map(|i| tx(&format!("ZELLE {}", i), -1.0)).collect(),
    ];

    for batch in batches {
        let total = batch.len();
        let outcome = engine.sweep(batch);
        assert_eq!(total - outcome.remaining.len(), outcome.swept_count);
        assert!(outcome
            .remaining
            .iter()
            .all(|t| !engine.should_exclude(&t.description)));
    }
}

#[test]
fn test_disabled_rules_never_match() {
    let mut engine = memory_rules();
    let rule = engine.add(vec![], "match everything");
    assert!(rule.matches("ANYTHING"));

    engine.update(
        &rule.id,
        spendsight_core::RuleUpdate {
            enabled: Some(false),
            ..Default::default()
        },
    );
    let rule = engine.get(&rule.id).unwrap();
    for d in ["", "ANYTHING", "NETFLIX"] {
        assert!(!rule.matches(d));
    }
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_joined_rule_survives_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rules.json");

    let joined_id = {
        let mut engine = json_rules(&path);
        let a = engine.add(vec!["netflix".to_string()], "Netflix");
        let b = engine.add(vec!["hulu".to_string()], "Hulu");
        engine.join(&[a.id, b.id], None).unwrap().id
    };

    let engine = json_rules(&path);
    assert_eq!(engine.list().len(), 1);
    let rule = engine.get(&joined_id).unwrap();
    assert_eq!(rule.title, "Netflix + Hulu");
    assert!(rule.matcher.is_joined());
    assert!(rule.matches("hulu plus"));

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["rules"][0]["kind"], "joined");
}

#[test]
fn test_legacy_rules_file_is_upgraded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rules.json");
    fs::write(
        &path,
        r#"{"rules": [
            {"id": "old-1", "keywords": ["netflix|OR|hulu,bill"], "title": "", "enabled": true, "swept_count": 2},
            {"id": "old-2", "keywords": ["venmo"], "title": "Venmo", "enabled": false, "swept_count": 0}
        ]}"#,
    )
    .unwrap();

    let mut engine = json_rules(&path);
    assert_eq!(
        engine.get("old-1").unwrap().matcher,
        RuleMatcher::Joined {
            groups: vec![
                vec!["netflix".to_string()],
                vec!["hulu".to_string(), "bill".to_string()],
            ]
        }
    );
    assert!(!engine.should_exclude("VENMO PAYMENT"));

    let outcome = engine.sweep(vec![tx("HULU BILL", -7.99), tx("HULU", -7.99)]);
    assert_eq!(outcome.swept_count, 1);

    let raw = fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("|OR|"));
    assert!(raw.contains("\"groups\""));
}

#[test]
fn test_corrupt_store_starts_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rules.json");
    fs::write(&path, "not json at all").unwrap();

    let mut engine = json_rules(&path);
    assert!(engine.list().is_empty());

    engine.add(vec!["uber".to_string()], "");
    let reloaded = json_rules(&path);
    assert_eq!(reloaded.list().len(), 1);
}

#[test]
fn test_period_notes_persist() {
    let dir = TempDir::new().unwrap();
    let config = Config::with_data_dir(dir.path());
    let key = PeriodKey::weekly(date(2024, 1, 10));

    {
        let mut notes = PeriodNotes::new(notes_store(&config));
        notes.save(&key, "Car repair week");
    }

    let notes = PeriodNotes::new(notes_store(&config));
    assert_eq!(notes.get("weekly_2024-01-07"), "Car repair week");
    assert!(config.notes_path().exists());
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn test_incremental_export_skips_reclassified_rows() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("sheet.csv");

    let first = vec![tx("NETFLIX.COM", -15.5), tx("HULU", -7.99)];
    let file = fs::File::create(&sheet).unwrap();
    write_sheet_rows(file, &first).unwrap();

    let existing = read_existing_keys(fs::File::open(&sheet).unwrap()).unwrap();

    let mut second = first.clone();
    second[0].category = "Streaming".to_string();
    second[0].necessity = NecessityLevel::Wants;
    second[1].amount = -7.990000001;
    second.push(tx("SPOTIFY", -10.99));

    let plan = plan_incremental(&existing, &second);
    assert_eq!(plan.duplicate_count, 2);
    assert_eq!(plan.new_rows.len(), 1);
    assert_eq!(plan.new_rows[0].description, "SPOTIFY");
}

#[test]
fn test_hand_tagged_sheet_drives_budget_health() {
    let dir = TempDir::new().unwrap();
    let sheet = dir.path().join("sheet.csv");

    let rows = vec![tx("RENT", -100.0), tx("CONCERT", -60.0), tx("BROKERAGE", -40.0)];
    write_sheet_rows(fs::File::create(&sheet).unwrap(), &rows).unwrap();

    // tag the Necessity column the way a user would in the spreadsheet
    let edited = fs::read_to_string(&sheet)
        .unwrap()
        .replacen("chase,Unknown", "chase,Needs", 1)
        .replacen("chase,Unknown", "chase,Wants", 1)
        .replacen("chase,Unknown", "chase,Savings", 1);
    fs::write(&sheet, edited).unwrap();

    let report = read_sheet(fs::File::open(&sheet).unwrap(), None).unwrap();
    assert_eq!(report.parsed.len(), 3);
    assert_eq!(report.parsed[0].necessity, NecessityLevel::Needs);
    assert_eq!(report.parsed[2].necessity, NecessityLevel::Savings);

    let health = BudgetHealthAnalyzer.analyze(&report.parsed);
    assert_eq!(health.report().unwrap().overall_health, OverallHealth::Excellent);
}
