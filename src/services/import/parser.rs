//! Playwright JSON report decoding.
//!
//! Shape is validated here and only here. Everything optional in the report is
//! modelled as `Option` (or an empty `Vec`), and entries that fail to decode
//! individually are kept as [`Lenient::Malformed`] so one bad test cannot sink
//! the rest of the report.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value as JsonValue};

use crate::error::{AppError, AppResult};

// ============================================================================
// Playwright JSON Schema Structs
// ============================================================================

/// Root structure of Playwright results.json.
#[derive(Debug, Clone)]
pub struct PlaywrightReport {
    pub stats: PlaywrightStats,
    /// Runner configuration, kept verbatim.
    pub config: JsonValue,
    pub suites: Vec<Lenient<PlaywrightSuite>>,
}

/// Playwright stats section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaywrightStats {
    #[serde(default)]
    pub start_time: Option<String>,
    /// Milliseconds; Playwright writes fractional values.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub expected: Option<i32>,
    #[serde(default)]
    pub unexpected: Option<i32>,
    #[serde(default)]
    pub skipped: Option<i32>,
}

impl PlaywrightStats {
    pub fn expected(&self) -> i32 {
        self.expected.unwrap_or(0)
    }

    pub fn unexpected(&self) -> i32 {
        self.unexpected.unwrap_or(0)
    }

    pub fn skipped(&self) -> i32 {
        self.skipped.unwrap_or(0)
    }

    /// `expected + unexpected + skipped`, or `None` when a count is negative
    /// or the sum does not fit a run counter.
    pub fn total(&self) -> Option<i32> {
        let counts = [self.expected(), self.unexpected(), self.skipped()];
        if counts.iter().any(|c| *c < 0) {
            return None;
        }
        counts.iter().try_fold(0i32, |sum, c| sum.checked_add(*c))
    }
}

fn validate_stats(stats: &PlaywrightStats) -> AppResult<()> {
    let counts = [
        ("expected", stats.expected()),
        ("unexpected", stats.unexpected()),
        ("skipped", stats.skipped()),
    ];
    if let Some((name, count)) = counts.iter().find(|(_, count)| *count < 0) {
        return Err(AppError::MalformedInput(format!(
            "Invalid 'stats' section: '{}' is negative ({})",
            name, count
        )));
    }
    if stats.total().is_none() {
        return Err(AppError::MalformedInput(
            "Invalid 'stats' section: test counts overflow the run total".to_string(),
        ));
    }
    Ok(())
}

/// Playwright test suite (a file, or a `describe` block nested in one).
#[derive(Debug, Clone, Deserialize)]
pub struct PlaywrightSuite {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub specs: Vec<Lenient<PlaywrightSpec>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suites: Vec<Lenient<PlaywrightSuite>>,
}

/// Playwright test specification.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaywrightSpec {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tests: Vec<Lenient<PlaywrightTest>>,
}

/// Playwright test (can have multiple results due to retries).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaywrightTest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    /// Test-level outcome: `expected`, `unexpected`, `flaky` or `skipped`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub annotations: Vec<JsonValue>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<PlaywrightResult>,
}

/// Playwright test result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaywrightResult {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub retry: Option<i32>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub worker_index: Option<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<PlaywrightError>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attachments: Vec<JsonValue>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub annotations: Vec<JsonValue>,
}

/// Error reported by a test result.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaywrightError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub stack: Option<String>,
}

/// A report entry that either decoded cleanly or is kept as a marker with the
/// decode failure.
#[derive(Debug, Clone)]
pub enum Lenient<T> {
    Valid(T),
    Malformed { reason: String },
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Lenient<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        Ok(match serde_json::from_value(value) {
            Ok(parsed) => Lenient::Valid(parsed),
            Err(e) => Lenient::Malformed {
                reason: e.to_string(),
            },
        })
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Parsing
// ============================================================================

/// Read and decode the report at `path`.
///
/// Fails with `NotFound` when the path is not an existing file and with
/// `MalformedInput` when the content is not a JSON object of the expected shape.
pub async fn parse_report_file(path: &Path) -> AppResult<PlaywrightReport> {
    let is_file = tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(AppError::NotFound(format!(
            "Report file {}",
            path.display()
        )));
    }

    let content = tokio::fs::read(path).await?;
    let content = String::from_utf8(content).map_err(|e| {
        AppError::MalformedInput(format!("Report is not valid UTF-8: {}", e))
    })?;

    parse_report_str(&content)
}

/// Decode a report from a JSON string.
pub fn parse_report_str(content: &str) -> AppResult<PlaywrightReport> {
    let value: JsonValue = serde_json::from_str(content)
        .map_err(|e| AppError::MalformedInput(format!("Failed to parse report JSON: {}", e)))?;
    parse_report_value(value)
}

/// Decode a report from an already-parsed JSON value.
pub fn parse_report_value(value: JsonValue) -> AppResult<PlaywrightReport> {
    let JsonValue::Object(mut root) = value else {
        return Err(AppError::MalformedInput(
            "Report root must be a JSON object".to_string(),
        ));
    };

    let stats = match take_present(&mut root, "stats") {
        Some(stats) => serde_json::from_value(stats)
            .map_err(|e| AppError::MalformedInput(format!("Invalid 'stats' section: {}", e)))?,
        None => PlaywrightStats::default(),
    };
    validate_stats(&stats)?;

    let config = take_present(&mut root, "config").unwrap_or_else(|| JsonValue::Object(Map::new()));

    let suites = match take_present(&mut root, "suites") {
        Some(JsonValue::Array(items)) => items
            .into_iter()
            .map(serde_json::from_value::<Lenient<PlaywrightSuite>>)
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(AppError::MalformedInput(
                "'suites' must be an array".to_string(),
            ));
        }
        None => Vec::new(),
    };

    Ok(PlaywrightReport {
        stats,
        config,
        suites,
    })
}

/// Remove `key` from `root`, treating JSON `null` as absent.
fn take_present(root: &mut Map<String, JsonValue>, key: &str) -> Option<JsonValue> {
    root.remove(key).filter(|v| !v.is_null())
}
