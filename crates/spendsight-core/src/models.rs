//! Domain models for Spendsight

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A bank-statement transaction
///
/// The first five fields come from the parsing collaborator and are never
/// modified by the engines. Only `necessity`, `recurrence` and `note` are
/// written after import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    /// Negative = expense, positive = income
    pub amount: f64,
    /// Category label supplied by the bank export
    pub category: String,
    /// Origin tag (e.g. "chase", "discover")
    pub bank: String,
    #[serde(default)]
    pub necessity: NecessityLevel,
    #[serde(default)]
    pub recurrence: RecurrenceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Transaction {
    /// Create an unclassified transaction
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        bank: impl Into<String>,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
            category: category.into(),
            bank: bank.into(),
            necessity: NecessityLevel::Unknown,
            recurrence: RecurrenceType::Unknown,
            note: None,
        }
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }

    /// Month bucket in `YYYY-MM` form
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }

    /// Key used by the spreadsheet sync to skip rows it already exported
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::new(self.date, &self.description, self.amount, &self.bank)
    }
}

/// Identity of a transaction for export deduplication
///
/// Deliberately excludes category and every classification field, so
/// re-tagging a transaction never causes it to be exported twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DedupKey {
    pub date: NaiveDate,
    pub description: String,
    /// Amount in cents so `-15.5` and `-15.50` compare equal
    pub amount_cents: i64,
    pub bank: String,
}

impl DedupKey {
    pub fn new(date: NaiveDate, description: &str, amount: f64, bank: &str) -> Self {
        Self {
            date,
            description: description.to_string(),
            amount_cents: (amount * 100.0).round() as i64,
            bank: bank.to_string(),
        }
    }

    /// Stable SHA-256 hex digest of the key
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.date.to_string().as_bytes());
        hasher.update([0u8]);
        hasher.update(self.description.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.amount_cents.to_be_bytes());
        hasher.update(self.bank.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// 50/30/20 budgeting role of an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NecessityLevel {
    Needs,
    Wants,
    Savings,
    #[default]
    Unknown,
}

impl NecessityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Needs => "Needs",
            Self::Wants => "Wants",
            Self::Savings => "Savings",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::str::FromStr for NecessityLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "needs" | "need" => Ok(Self::Needs),
            "wants" | "want" => Ok(Self::Wants),
            "savings" | "saving" => Ok(Self::Savings),
            "unknown" | "" => Ok(Self::Unknown),
            _ => Err(format!("Unknown necessity level: {}", s)),
        }
    }
}

impl std::fmt::Display for NecessityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Billing cadence of an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RecurrenceType {
    Subscription,
    Recurring,
    #[serde(rename = "One-time")]
    OneTime,
    #[default]
    Unknown,
}

impl RecurrenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscription => "Subscription",
            Self::Recurring => "Recurring",
            Self::OneTime => "One-time",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::str::FromStr for RecurrenceType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "subscription" => Ok(Self::Subscription),
            "recurring" => Ok(Self::Recurring),
            "one-time" | "onetime" | "one_time" => Ok(Self::OneTime),
            "unknown" | "" => Ok(Self::Unknown),
            _ => Err(format!("Unknown recurrence type: {}", s)),
        }
    }
}

impl std::fmt::Display for RecurrenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recurring expense billing frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    #[default]
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Round to a fixed number of decimal places for reporting
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_expense_and_income_flags() {
        let expense = Transaction::new(date(2024, 1, 5), "COFFEE", -4.5, "Food", "chase");
        let income = Transaction::new(date(2024, 1, 5), "PAYROLL", 2500.0, "Income", "chase");
        let zero = Transaction::new(date(2024, 1, 5), "ADJUSTMENT", 0.0, "Other", "chase");

        assert!(expense.is_expense());
        assert!(!expense.is_income());
        assert!(income.is_income());
        assert!(!zero.is_expense());
        assert!(!zero.is_income());
    }

    #[test]
    fn test_dedup_key_ignores_classification() {
        let mut a = Transaction::new(date(2024, 2, 1), "NETFLIX.COM", -15.5, "Entertainment", "chase");
        let mut b = a.clone();
        b.category = "Streaming".to_string();
        b.necessity = NecessityLevel::Wants;
        b.recurrence = RecurrenceType::Subscription;
        b.note = Some("family plan".to_string());
        a.amount = -15.500000001;

        assert_eq!(a.dedup_key(), b.dedup_key());
        assert_eq!(a.dedup_key().fingerprint(), b.dedup_key().fingerprint());
    }

    #[test]
    fn test_dedup_key_distinguishes_bank() {
        let a = Transaction::new(date(2024, 2, 1), "NETFLIX.COM", -15.49, "", "chase");
        let b = Transaction::new(date(2024, 2, 1), "NETFLIX.COM", -15.49, "", "discover");
        assert_ne!(a.dedup_key(), b.dedup_key());
        assert_ne!(a.dedup_key().fingerprint(), b.dedup_key().fingerprint());
    }

    #[test]
    fn test_recurrence_serde_labels() {
        let json = serde_json::to_string(&RecurrenceType::OneTime).unwrap();
        assert_eq!(json, "\"One-time\"");
        let parsed: RecurrenceType = serde_json::from_str("\"Subscription\"").unwrap();
        assert_eq!(parsed, RecurrenceType::Subscription);
    }

    #[test]
    fn test_transaction_defaults_on_deserialize() {
        let json = r#"{"date":"2024-03-01","description":"RENT","amount":-1200.0,"category":"Housing","bank":"chase"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.necessity, NecessityLevel::Unknown);
        assert_eq!(tx.recurrence, RecurrenceType::Unknown);
        assert!(tx.note.is_none());
        assert_eq!(tx.month_key(), "2024-03");
    }

    #[test]
    fn test_enum_from_str() {
        assert_eq!("wants".parse::<NecessityLevel>().unwrap(), NecessityLevel::Wants);
        assert_eq!("One-time".parse::<RecurrenceType>().unwrap(), RecurrenceType::OneTime);
        assert_eq!("Weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert!("yearly".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.346, 2), 12.35);
        assert_eq!(round_to(33.333, 1), 33.3);
    }
}
