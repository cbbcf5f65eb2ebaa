//! Case import: one stored case per report test.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::config::ImportDefaults;
use crate::db::DbPool;
use crate::db::test_cases::NewTestCase;
use crate::entity::test_case;
use crate::error::AppResult;
use crate::models::{CaseStatus, Engine};

use super::ImportWarning;
use super::parser::{PlaywrightResult, PlaywrightTest};
use super::time::{self, TimeSource};

/// Where a test sits in the report, for naming and diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct TestLocation<'a> {
    pub suite_id: uuid::Uuid,
    pub suite_name: &'a str,
    pub spec_title: Option<&'a str>,
    /// JSON path of the test entry, e.g. `suites[0].specs[1].tests[0]`.
    pub path: &'a str,
}

/// Classify a project name. Unrecognised names fall back to [`Engine::DEFAULT`].
pub fn classify_engine(project_name: Option<&str>) -> (Engine, Option<ImportWarning>) {
    match project_name.filter(|p| !p.is_empty()) {
        None => (Engine::DEFAULT, None),
        Some(name) => match Engine::from_project_name(name) {
            Some(engine) => (engine, None),
            None => {
                debug!(project = %name, "Unrecognized project name, defaulting to {}", Engine::DEFAULT);
                (
                    Engine::DEFAULT,
                    Some(ImportWarning::UnrecognizedProject {
                        project_name: name.to_string(),
                    }),
                )
            }
        },
    }
}

/// Status stored for a test, judged from its test-level outcome and its
/// representative result.
pub fn case_status(
    test: &PlaywrightTest,
    result: &PlaywrightResult,
) -> (CaseStatus, Option<ImportWarning>) {
    if test.status.as_deref() == Some("flaky") {
        return (CaseStatus::Flaky, None);
    }

    let raw = result.status.as_deref().unwrap_or("");
    match CaseStatus::from_result_status(raw) {
        Some(status) => (status, None),
        None => {
            warn!("Unknown test status: {:?}, treating as failed", raw);
            (
                CaseStatus::Failed,
                Some(ImportWarning::UnknownStatus {
                    status: raw.to_string(),
                }),
            )
        }
    }
}

/// Build the case row for `test`, or `None` when it has no results.
///
/// Only the first result is kept; later retries are not stored. Only the
/// first error of that result is kept.
pub fn build_case(
    defaults: &ImportDefaults,
    run_id: uuid::Uuid,
    location: TestLocation<'_>,
    test: &PlaywrightTest,
    now: DateTime<Utc>,
    warnings: &mut Vec<ImportWarning>,
) -> Option<NewTestCase> {
    let title = test
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .or(location.spec_title.filter(|t| !t.is_empty()))
        .unwrap_or(defaults.test_title.as_str())
        .to_string();

    let Some(result) = test.results.first() else {
        warnings.push(ImportWarning::EmptyResult {
            suite: location.suite_name.to_string(),
            test: title,
        });
        return None;
    };

    let (status, status_warning) = case_status(test, result);
    let (browser, engine_warning) = classify_engine(test.project_name.as_deref());
    warnings.extend(status_warning);
    warnings.extend(engine_warning);

    let (started_at, source) = time::resolve_instant(result.start_time.as_deref(), now);
    if source == TimeSource::Unparseable {
        warnings.push(ImportWarning::InvalidTimestamp {
            path: location.path.to_string(),
            value: result.start_time.clone().unwrap_or_default(),
        });
    }

    let first_error = result.errors.first();
    let annotations = if result.annotations.is_empty() {
        &test.annotations
    } else {
        &result.annotations
    };

    Some(NewTestCase {
        run_id,
        suite_id: location.suite_id,
        title,
        status,
        browser,
        duration_ms: time::duration_ms(result.duration),
        retry_count: result.retry.unwrap_or(0),
        error_message: first_error.and_then(|e| e.message.clone()),
        error_stack: first_error.and_then(|e| e.stack.clone()),
        attachments: JsonValue::Array(result.attachments.clone()),
        annotations: JsonValue::Array(annotations.clone()),
        worker_index: result.worker_index,
        started_at,
    })
}

/// Persists cases for one run.
pub struct CaseImporter<'a> {
    pool: &'a DbPool,
    defaults: &'a ImportDefaults,
    run_id: uuid::Uuid,
    now: DateTime<Utc>,
}

impl<'a> CaseImporter<'a> {
    pub fn new(
        pool: &'a DbPool,
        defaults: &'a ImportDefaults,
        run_id: uuid::Uuid,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            pool,
            defaults,
            run_id,
            now,
        }
    }

    /// Import one test. Returns `None` (and records a warning) when the test
    /// has no results.
    pub async fn import_test(
        &self,
        location: TestLocation<'_>,
        test: &PlaywrightTest,
        warnings: &mut Vec<ImportWarning>,
    ) -> AppResult<Option<test_case::Model>> {
        let Some(new_case) =
            build_case(self.defaults, self.run_id, location, test, self.now, warnings)
        else {
            debug!(path = %location.path, "Test has no results, skipping");
            return Ok(None);
        };

        let created = self.pool.insert_test_case(new_case).await?;
        Ok(Some(created))
    }
}
