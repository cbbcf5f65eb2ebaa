//! Run status and derived run metrics.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle status of an imported run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Passed,
    Failed,
    Error,
}

impl RunStatus {
    /// Derive the status from report-level counters.
    ///
    /// Any unexpected outcome fails the run; otherwise at least one expected
    /// outcome is needed to pass. All-skipped and empty reports are `Error`.
    pub fn from_counts(expected: i32, unexpected: i32) -> Self {
        if unexpected > 0 {
            Self::Failed
        } else if expected > 0 {
            Self::Passed
        } else {
            Self::Error
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Error => "error",
        }
    }

    /// Parse from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "passed" => Some(Self::Passed),
            "failed" => Some(Self::Failed),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Percentage of passed tests, rounded to two decimals. Zero when `total` is zero.
pub fn success_rate(passed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    ((passed as f64 / total as f64) * 10_000.0).round() / 100.0
}
