//! Exclusion ("sweep") rules
//!
//! A rule removes matching transactions from the working set. Two matcher
//! shapes share one rule type:
//!
//! - **Simple** - every keyword must appear in the description (AND)
//! - **Joined** - several keyword groups, any of which may match (OR of ANDs)
//!
//! Joined rules are produced by [`ExclusionRuleEngine::join`], which retires
//! the source rules. Matching is always case-insensitive substring search.
//!
//! Older rule files stored joined rules as a single keyword such as
//! `"netflix|OR|hulu,bill"`; those are upgraded to the `Joined` variant when
//! loaded.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::keywords::{contains_all, contains_all_lower, normalize_keywords};
use crate::models::Transaction;
use crate::store::{load_or_empty, save_or_warn, Store};

/// Separator between groups in the legacy flat encoding
const LEGACY_OR_MARKER: &str = "|OR|";

/// Longest description returned by a match preview before truncation
const PREVIEW_DESCRIPTION_LEN: usize = 80;

/// How a rule decides whether it matches a description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleMatcher {
    /// All keywords must be present
    Simple { keywords: Vec<String> },
    /// At least one group must be fully present
    Joined { groups: Vec<Vec<String>> },
}

impl RuleMatcher {
    /// Evaluate against an already-lowercased description
    fn matches_lower(&self, haystack: &str) -> bool {
        match self {
            Self::Simple { keywords } => contains_all_lower(haystack, keywords),
            Self::Joined { groups } => groups
                .iter()
                .any(|group| !group.is_empty() && contains_all_lower(haystack, group)),
        }
    }

    /// Keyword groups this matcher ORs together (one group for a simple rule)
    pub fn groups(&self) -> Vec<Vec<String>> {
        match self {
            Self::Simple { keywords } => vec![keywords.clone()],
            Self::Joined { groups } => groups.clone(),
        }
    }

    pub fn is_joined(&self) -> bool {
        matches!(self, Self::Joined { .. })
    }

    /// Parse the legacy flat keyword list, where a single entry containing
    /// `|OR|` encodes comma-separated groups
    fn from_legacy_keywords(keywords: Vec<String>) -> Self {
        if keywords.len() == 1 && keywords[0].contains(LEGACY_OR_MARKER) {
            let groups = keywords[0]
                .split(LEGACY_OR_MARKER)
                .map(|set| normalize_keywords(set.split(',')))
                .collect();
            return Self::Joined { groups };
        }
        Self::Simple { keywords }
    }
}

/// A user-defined exclusion rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRule")]
pub struct ExclusionRule {
    pub id: String,
    /// Display name (may be empty)
    pub title: String,
    #[serde(flatten)]
    pub matcher: RuleMatcher,
    pub enabled: bool,
    /// Total transactions this rule has swept over its lifetime
    pub swept_count: u64,
}

impl ExclusionRule {
    /// Create an enabled simple rule with a fresh id
    pub fn new(keywords: Vec<String>, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            matcher: RuleMatcher::Simple { keywords },
            enabled: true,
            swept_count: 0,
        }
    }

    /// Whether this rule would sweep a transaction with `description`.
    /// Disabled rules never match.
    pub fn matches(&self, description: &str) -> bool {
        self.enabled && self.matcher.matches_lower(&description.to_lowercase())
    }

    fn matches_lower(&self, haystack: &str) -> bool {
        self.enabled && self.matcher.matches_lower(haystack)
    }
}

/// On-disk shape, accepting both the tagged form and the legacy one
#[derive(Deserialize)]
struct RawRule {
    id: Option<String>,
    #[serde(default)]
    title: String,
    kind: Option<String>,
    keywords: Option<Vec<String>>,
    groups: Option<Vec<Vec<String>>>,
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    swept_count: u64,
}

fn default_enabled() -> bool {
    true
}

impl From<RawRule> for ExclusionRule {
    fn from(raw: RawRule) -> Self {
        let matcher = match (raw.kind.as_deref(), raw.groups, raw.keywords) {
            (Some("joined"), Some(groups), _) | (None, Some(groups), _) => {
                RuleMatcher::Joined { groups }
            }
            // tagged rules are taken literally; only untagged ones can carry `|OR|`
            (Some("simple"), _, Some(keywords)) => RuleMatcher::Simple { keywords },
            (None, _, Some(keywords)) => RuleMatcher::from_legacy_keywords(keywords),
            (Some(_), _, Some(keywords)) => RuleMatcher::Simple { keywords },
            (_, Some(groups), None) => RuleMatcher::Joined { groups },
            (_, None, None) => RuleMatcher::Simple { keywords: Vec::new() },
        };

        Self {
            id: raw.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: raw.title,
            matcher,
            enabled: raw.enabled,
            swept_count: raw.swept_count,
        }
    }
}

/// Partial update for [`ExclusionRuleEngine::update`]
#[derive(Debug, Clone, Default)]
pub struct RuleUpdate {
    /// Replaces the matcher with a simple AND rule
    pub keywords: Option<Vec<String>>,
    pub title: Option<String>,
    pub enabled: Option<bool>,
}

/// Result of a sweep pass
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    /// Surviving transactions in their original order
    pub remaining: Vec<Transaction>,
    pub swept_count: usize,
}

/// Transactions an unsaved keyword list would match
#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchPreview {
    pub count: usize,
    /// Matching descriptions, truncated for display
    pub descriptions: Vec<String>,
}

/// Owns the rule collection and applies it to transaction sets
pub struct ExclusionRuleEngine<S: Store<ExclusionRule>> {
    rules: Vec<ExclusionRule>,
    store: S,
}

impl<S: Store<ExclusionRule>> ExclusionRuleEngine<S> {
    /// Load rules from `store`; an unreadable store yields an empty engine
    pub fn new(store: S) -> Self {
        let rules = load_or_empty(&store);
        Self { rules, store }
    }

    fn persist(&self) {
        save_or_warn(&self.store, &self.rules);
    }

    pub fn add(&mut self, keywords: Vec<String>, title: impl Into<String>) -> ExclusionRule {
        let rule = ExclusionRule::new(normalize_keywords(keywords), title);
        info!(id = %rule.id, "Added exclusion rule");
        self.rules.push(rule.clone());
        self.persist();
        rule
    }

    /// Apply `update` to the rule with `id`; `None` if there is no such rule
    pub fn update(&mut self, id: &str, update: RuleUpdate) -> Option<ExclusionRule> {
        let rule = self.rules.iter_mut().find(|r| r.id == id)?;

        if let Some(keywords) = update.keywords {
            rule.matcher = RuleMatcher::Simple {
                keywords: normalize_keywords(keywords),
            };
        }
        if let Some(title) = update.title {
            rule.title = title;
        }
        if let Some(enabled) = update.enabled {
            rule.enabled = enabled;
        }

        let updated = rule.clone();
        self.persist();
        Some(updated)
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let Some(pos) = self.rules.iter().position(|r| r.id == id) else {
            return false;
        };
        self.rules.remove(pos);
        self.persist();
        true
    }

    pub fn get(&self, id: &str) -> Option<&ExclusionRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// All rules in evaluation order
    pub fn list(&self) -> &[ExclusionRule] {
        &self.rules
    }

    /// Whether any enabled rule matches `description`
    pub fn should_exclude(&self, description: &str) -> bool {
        let haystack = description.to_lowercase();
        self.rules.iter().any(|r| r.matches_lower(&haystack))
    }

    /// Remove every transaction matched by an enabled rule.
    ///
    /// The first matching rule in list order claims the transaction and gets
    /// the credit in its `swept_count`. Counters are only written back when
    /// something was swept.
    pub fn sweep(&mut self, transactions: Vec<Transaction>) -> SweepOutcome {
        let mut hits = vec![0u64; self.rules.len()];
        let mut remaining = Vec::with_capacity(transactions.len());
        let mut swept_count = 0;

        for tx in transactions {
            let haystack = tx.description.to_lowercase();
            match self.rules.iter().position(|r| r.matches_lower(&haystack)) {
                Some(idx) => {
                    hits[idx] += 1;
                    swept_count += 1;
                }
                None => remaining.push(tx),
            }
        }

        if swept_count > 0 {
            for (rule, count) in self.rules.iter_mut().zip(hits) {
                rule.swept_count += count;
            }
            self.persist();
            info!("Swept {} transactions", swept_count);
        } else {
            debug!("Sweep matched no transactions");
        }

        SweepOutcome {
            remaining,
            swept_count,
        }
    }

    /// Drop every transaction an enabled rule matches, leaving counters alone
    ///
    /// Used when re-reading a statement for reporting, where the same rows
    /// must not be credited to the rules again.
    pub fn filter(&self, transactions: Vec<Transaction>) -> Vec<Transaction> {
        let before = transactions.len();
        let remaining: Vec<Transaction> = transactions
            .into_iter()
            .filter(|tx| !self.should_exclude(&tx.description))
            .collect();
        debug!("Filtered {} of {} transactions", before - remaining.len(), before);
        remaining
    }

    /// Merge rules into one OR rule and retire the sources.
    ///
    /// At least two of `rule_ids` must name enabled rules, otherwise nothing
    /// changes and `None` is returned. Each source contributes its keyword
    /// groups; swept counts carry over.
    pub fn join(&mut self, rule_ids: &[String], title: Option<&str>) -> Option<ExclusionRule> {
        let sources: Vec<&ExclusionRule> = self
            .rules
            .iter()
            .filter(|r| r.enabled && rule_ids.contains(&r.id))
            .collect();

        if sources.len() < 2 {
            debug!("Join needs at least two enabled rules, got {}", sources.len());
            return None;
        }

        let groups: Vec<Vec<String>> = sources.iter().flat_map(|r| r.matcher.groups()).collect();
        let swept_count = sources.iter().map(|r| r.swept_count).sum();

        let title = match title.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => t.to_string(),
            None => {
                let titles: Vec<&str> = sources
                    .iter()
                    .map(|r| r.title.as_str())
                    .filter(|t| !t.is_empty())
                    .collect();
                if titles.is_empty() {
                    format!("Joined Rule ({} rules)", sources.len())
                } else {
                    titles.join(" + ")
                }
            }
        };

        let joined = ExclusionRule {
            id: Uuid::new_v4().to_string(),
            title,
            matcher: RuleMatcher::Joined { groups },
            enabled: true,
            swept_count,
        };

        self.rules.retain(|r| !rule_ids.contains(&r.id));
        self.rules.push(joined.clone());
        self.persist();

        info!(id = %joined.id, "Joined {} exclusion rules", rule_ids.len());
        Some(joined)
    }

    /// Count transactions an ad hoc AND keyword list would match
    pub fn preview_match_count<K: AsRef<str>>(
        &self,
        keywords: &[K],
        transactions: &[Transaction],
    ) -> MatchPreview {
        let descriptions: Vec<String> = transactions
            .iter()
            .filter(|t| contains_all(&t.description, keywords))
            .map(|t| truncate_description(&t.description))
            .collect();

        MatchPreview {
            count: descriptions.len(),
            descriptions,
        }
    }
}

fn truncate_description(description: &str) -> String {
    if description.chars().count() <= PREVIEW_DESCRIPTION_LEN {
        return description.to_string();
    }
    let head: String = description.chars().take(PREVIEW_DESCRIPTION_LEN).collect();
    format!("{}...", head)
}
