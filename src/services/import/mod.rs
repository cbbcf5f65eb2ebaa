//! Playwright report import pipeline.
//!
//! One report in, one run out:
//!
//! 1. Parse the report file. Missing or malformed input aborts here, before
//!    anything is written.
//! 2. Create the provisional run ([`runs::RunAggregator::create_run`]).
//! 3. Walk suites in document order, reconciling each suite and importing its
//!    tests. Failures of individual entries are recorded as warnings.
//! 4. Finalize the run timing ([`runs::RunAggregator::finalize_run`]).

pub mod cases;
pub mod parser;
pub mod runs;
pub mod suites;
pub mod time;

use std::path::Path;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::ImportDefaults;
use crate::db::DbPool;
use crate::entity::{test_run, test_suite};
use crate::error::AppResult;
use crate::models::success_rate;

use cases::{CaseImporter, TestLocation};
use parser::{Lenient, PlaywrightReport, PlaywrightSuite};
use runs::{FinishTime, RunAggregator};
use suites::SuiteReconciler;
use time::TimeSource;

/// Non-fatal conditions met during an import.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportWarning {
    #[error("user '{username}' not found, importing without an actor")]
    ActorNotFound { username: String },

    #[error("test '{test}' in suite '{suite}' has no results, skipped")]
    EmptyResult { suite: String, test: String },

    #[error("unrecognized project '{project_name}', stored as the default engine")]
    UnrecognizedProject { project_name: String },

    #[error("unknown result status '{status}', stored as failed")]
    UnknownStatus { status: String },

    #[error("unparseable timestamp '{value}' at {path}, import time used")]
    InvalidTimestamp { path: String, value: String },

    #[error("run duration of {duration_ms} ms does not fit after the start time, finish pinned to start")]
    DurationOutOfRange { duration_ms: i64 },

    #[error("malformed entry at {path}: {reason}")]
    MalformedEntry { path: String, reason: String },

    #[error("failed to import entry at {path}: {reason}")]
    EntryFailed { path: String, reason: String },
}

/// Outcome of a completed import.
#[derive(Debug, Clone)]
pub struct ImportSummary {
    /// The run as stored after finalization.
    pub run: test_run::Model,
    pub imported_cases: usize,
    pub suites_created: usize,
    /// Percentage of passed tests in the run, rounded to 2 decimals.
    pub success_rate: f64,
    pub warnings: Vec<ImportWarning>,
}

impl ImportSummary {
    pub fn run_id(&self) -> uuid::Uuid {
        self.run.id
    }
}

/// Imports reports into the store.
pub struct ImportPipeline<'a> {
    pool: &'a DbPool,
    defaults: &'a ImportDefaults,
}

impl<'a> ImportPipeline<'a> {
    pub fn new(pool: &'a DbPool, defaults: &'a ImportDefaults) -> Self {
        Self { pool, defaults }
    }

    /// Import the report at `path`, attributing the run to `actor` when that
    /// user exists.
    pub async fn import_file(&self, path: &Path, actor: Option<&str>) -> AppResult<ImportSummary> {
        info!(path = %path.display(), "Importing report");
        let report = parser::parse_report_file(path).await?;
        self.import_report(report, actor).await
    }

    /// Import an already-parsed report.
    pub async fn import_report(
        &self,
        report: PlaywrightReport,
        actor: Option<&str>,
    ) -> AppResult<ImportSummary> {
        // The import clock is read once so every substituted timestamp agrees.
        let now = Utc::now();
        let mut warnings = Vec::new();

        let executed_by = match actor.filter(|a| !a.is_empty()) {
            Some(username) => match self.pool.find_user_by_username(username).await? {
                Some(user) => Some(user.id),
                None => {
                    warn!(username = %username, "User not found, importing without an actor");
                    warnings.push(ImportWarning::ActorNotFound {
                        username: username.to_string(),
                    });
                    None
                }
            },
            None => None,
        };

        let aggregator = RunAggregator::new(self.pool);
        let (run, source) = aggregator
            .create_run(&report.stats, report.config.clone(), executed_by, now)
            .await?;
        if source == TimeSource::Unparseable {
            warn!("Unparseable stats.startTime, using import time");
            warnings.push(ImportWarning::InvalidTimestamp {
                path: "stats.startTime".to_string(),
                value: report.stats.start_time.clone().unwrap_or_default(),
            });
        }

        let mut walker = SuiteWalker {
            reconciler: SuiteReconciler::new(self.pool, self.defaults),
            cases: CaseImporter::new(self.pool, self.defaults, run.id, now),
            imported_cases: 0,
            suites_created: 0,
            warnings,
        };

        for (i, entry) in report.suites.iter().enumerate() {
            walker.walk(entry, format!("suites[{}]", i), None).await;
        }

        let (run, finish) = aggregator.finalize_run(&run, &report.stats).await?;
        if let FinishTime::OutOfRange(_) = finish {
            let duration_ms = time::duration_ms(report.stats.duration);
            warn!(duration_ms, "Run duration out of range, finish pinned to start");
            walker
                .warnings
                .push(ImportWarning::DurationOutOfRange { duration_ms });
        }
        let rate = success_rate(i64::from(run.passed_tests), i64::from(run.total_tests));

        info!(
            run_id = %run.id,
            imported_cases = walker.imported_cases,
            suites_created = walker.suites_created,
            warnings = walker.warnings.len(),
            success_rate = rate,
            "Import complete"
        );

        Ok(ImportSummary {
            run,
            imported_cases: walker.imported_cases,
            suites_created: walker.suites_created,
            success_rate: rate,
            warnings: walker.warnings,
        })
    }
}

/// Depth-first walk over report suites for one run.
struct SuiteWalker<'a> {
    reconciler: SuiteReconciler<'a>,
    cases: CaseImporter<'a>,
    imported_cases: usize,
    suites_created: usize,
    warnings: Vec<ImportWarning>,
}

impl SuiteWalker<'_> {
    fn malformed(&mut self, path: String, reason: &str) {
        warn!(path = %path, reason = %reason, "Skipping malformed report entry");
        self.warnings.push(ImportWarning::MalformedEntry {
            path,
            reason: reason.to_string(),
        });
    }

    fn failed(&mut self, path: String, reason: String) {
        warn!(path = %path, reason = %reason, "Failed to import report entry");
        self.warnings.push(ImportWarning::EntryFailed { path, reason });
    }

    async fn walk(
        &mut self,
        entry: &Lenient<PlaywrightSuite>,
        path: String,
        parent_file: Option<&str>,
    ) {
        match entry {
            Lenient::Valid(suite) => self.walk_suite(suite, path, parent_file).await,
            Lenient::Malformed { reason } => self.malformed(path, reason),
        }
    }

    async fn walk_suite(&mut self, suite: &PlaywrightSuite, path: String, parent_file: Option<&str>) {
        let file = suite
            .file
            .as_deref()
            .filter(|f| !f.is_empty())
            .or(parent_file);

        match self.reconciler.reconcile(suite.title.as_deref(), file).await {
            Ok(resolved) => {
                if resolved.created {
                    self.suites_created += 1;
                }
                self.import_specs(suite, &resolved.model, &path).await;
            }
            Err(e) => self.failed(path.clone(), e.to_string()),
        }

        for (i, child) in suite.suites.iter().enumerate() {
            Box::pin(self.walk(child, format!("{}.suites[{}]", path, i), file)).await;
        }
    }

    async fn import_specs(
        &mut self,
        suite: &PlaywrightSuite,
        model: &test_suite::Model,
        suite_path: &str,
    ) {
        for (j, spec_entry) in suite.specs.iter().enumerate() {
            let spec_path = format!("{}.specs[{}]", suite_path, j);
            let spec = match spec_entry {
                Lenient::Valid(spec) => spec,
                Lenient::Malformed { reason } => {
                    self.malformed(spec_path, reason);
                    continue;
                }
            };

            for (k, test_entry) in spec.tests.iter().enumerate() {
                let test_path = format!("{}.tests[{}]", spec_path, k);
                let test = match test_entry {
                    Lenient::Valid(test) => test,
                    Lenient::Malformed { reason } => {
                        self.malformed(test_path, reason);
                        continue;
                    }
                };

                let location = TestLocation {
                    suite_id: model.id,
                    suite_name: &model.name,
                    spec_title: spec.title.as_deref(),
                    path: &test_path,
                };

                match self.cases.import_test(location, test, &mut self.warnings).await {
                    Ok(Some(case)) => {
                        debug!(case_id = %case.id, title = %case.title, "Case imported");
                        self.imported_cases += 1;
                    }
                    Ok(None) => {}
                    Err(e) => self.failed(test_path.clone(), e.to_string()),
                }
            }
        }
    }
}
