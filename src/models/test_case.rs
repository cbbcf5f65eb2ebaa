//! Case status and browser engine vocabulary.
//!
//! These enums are the boundary between Playwright's report vocabulary and
//! what the dashboard stores.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outcome recorded for a single test in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Passed,
    Failed,
    Skipped,
    Flaky,
}

impl CaseStatus {
    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Flaky => "flaky",
        }
    }

    /// Map a Playwright result status. `None` means the value is not part of
    /// the runner's vocabulary.
    pub fn from_result_status(status: &str) -> Option<Self> {
        match status {
            "passed" => Some(Self::Passed),
            "failed" | "timedOut" | "interrupted" => Some(Self::Failed),
            "skipped" => Some(Self::Skipped),
            "flaky" => Some(Self::Flaky),
            _ => None,
        }
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Browser engine a test executed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Chromium,
    Firefox,
    Webkit,
    Msedge,
}

impl Engine {
    /// Engine assigned to projects whose name is not a core engine.
    pub const DEFAULT: Engine = Engine::Chromium;

    /// Engines recognised directly from a project name.
    pub const CORE: [Engine; 3] = [Engine::Chromium, Engine::Firefox, Engine::Webkit];

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chromium => "chromium",
            Self::Firefox => "firefox",
            Self::Webkit => "webkit",
            Self::Msedge => "msedge",
        }
    }

    /// Parse a stored engine value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "chromium" => Some(Self::Chromium),
            "firefox" => Some(Self::Firefox),
            "webkit" => Some(Self::Webkit),
            "msedge" => Some(Self::Msedge),
            _ => None,
        }
    }

    /// Match a project name (case-insensitive) against the core engines.
    pub fn from_project_name(project_name: &str) -> Option<Self> {
        let lowered = project_name.to_lowercase();
        Self::CORE.into_iter().find(|e| e.as_str() == lowered)
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
