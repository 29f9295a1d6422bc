//! Shared types for the analytics layer

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which analyzer produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerKind {
    BudgetHealth,
    Subscriptions,
    Reductions,
    Dimensions,
    Monthly,
}

impl AnalyzerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzerKind::BudgetHealth => "budget_health",
            AnalyzerKind::Subscriptions => "subscriptions",
            AnalyzerKind::Reductions => "reductions",
            AnalyzerKind::Dimensions => "dimensions",
            AnalyzerKind::Monthly => "monthly",
        }
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Health of a single 50/30/20 bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Good,
    Warning,
    Critical,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Good => "good",
            HealthStatus::Warning => "warning",
            HealthStatus::Critical => "critical",
        }
    }

    /// Contribution to the overall health score
    pub fn score(&self) -> u8 {
        match self {
            HealthStatus::Good => 3,
            HealthStatus::Warning => 2,
            HealthStatus::Critical => 1,
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "good" => Ok(HealthStatus::Good),
            "warning" => Ok(HealthStatus::Warning),
            "critical" => Ok(HealthStatus::Critical),
            _ => Err(format!("Unknown health status: {}", s)),
        }
    }
}

/// Overall verdict from the summed bucket scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverallHealth {
    Excellent,
    Good,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
    Critical,
}

impl OverallHealth {
    /// Map a score in 3..=9 to a verdict
    pub fn from_score(score: u8) -> Self {
        match score {
            8.. => OverallHealth::Excellent,
            6..=7 => OverallHealth::Good,
            4..=5 => OverallHealth::NeedsImprovement,
            _ => OverallHealth::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OverallHealth::Excellent => "Excellent",
            OverallHealth::Good => "Good",
            OverallHealth::NeedsImprovement => "Needs Improvement",
            OverallHealth::Critical => "Critical",
        }
    }
}

impl fmt::Display for OverallHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Urgency of a reduction opportunity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
