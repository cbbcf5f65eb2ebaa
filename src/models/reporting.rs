//! Response shapes for the reporting read layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{test_case, test_run, test_suite};

use super::{Pagination, PaginationParams, success_rate};

/// Filters accepted by the run list.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RunListQuery {
    /// Exact run status (`running`, `passed`, `failed`, `error`).
    pub status: Option<String>,
    /// Inclusive lower bound on the start date (UTC).
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the start date (UTC).
    pub date_to: Option<NaiveDate>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl RunListQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// One row of the run list.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RunSummary {
    pub id: Uuid,
    pub status: String,
    /// Username of the actor who imported the run.
    pub executed_by: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_ms: i64,
    pub total_tests: i32,
    pub passed_tests: i32,
    pub failed_tests: i32,
    pub skipped_tests: i32,
    pub success_rate: f64,
}

impl RunSummary {
    pub fn from_model(run: test_run::Model, executed_by: Option<String>) -> Self {
        RunSummary {
            success_rate: success_rate(run.passed_tests.into(), run.total_tests.into()),
            id: run.id,
            status: run.status,
            executed_by,
            started_at: run.started_at,
            finished_at: run.finished_at,
            duration_ms: run.duration_ms,
            total_tests: run.total_tests,
            passed_tests: run.passed_tests,
            failed_tests: run.failed_tests,
            skipped_tests: run.skipped_tests,
        }
    }
}

/// Paginated run list.
#[derive(Debug, Serialize, ToSchema)]
pub struct RunListResponse {
    pub runs: Vec<RunSummary>,
    pub pagination: Pagination,
}

/// A stored test case.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CaseResponse {
    pub id: Uuid,
    pub title: String,
    pub status: String,
    pub browser: String,
    pub duration_ms: i64,
    pub retry_count: i32,
    pub error_message: Option<String>,
    pub error_stack: Option<String>,
    pub attachments: serde_json::Value,
    pub annotations: serde_json::Value,
    pub worker_index: Option<i32>,
    pub started_at: DateTime<Utc>,
}

impl From<test_case::Model> for CaseResponse {
    fn from(case: test_case::Model) -> Self {
        CaseResponse {
            id: case.id,
            title: case.title,
            status: case.status,
            browser: case.browser,
            duration_ms: case.duration_ms,
            retry_count: case.retry_count,
            error_message: case.error_message,
            error_stack: case.error_stack,
            attachments: case.attachments,
            annotations: case.annotations,
            worker_index: case.worker_index,
            started_at: case.started_at,
        }
    }
}

/// Cases of one run belonging to the same suite.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SuiteGroup {
    pub suite_id: Uuid,
    pub suite_name: String,
    pub file_path: String,
    pub cases: Vec<CaseResponse>,
}

/// Per-engine aggregate over a set of cases.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EngineStats {
    pub browser: String,
    pub count: u64,
    pub passed: u64,
    pub failed: u64,
    pub avg_duration_ms: f64,
}

/// Run with its cases grouped by suite and aggregated per engine.
#[derive(Debug, Serialize, ToSchema)]
pub struct RunDetail {
    pub run: RunSummary,
    /// Runner configuration exactly as imported.
    pub config: serde_json::Value,
    pub suites: Vec<SuiteGroup>,
    pub browser_stats: Vec<EngineStats>,
}

/// Suite with case counts.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SuiteSummary {
    pub id: Uuid,
    pub name: String,
    pub file_path: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub total_tests: u64,
    /// Cases recorded by runs started inside the recent window.
    pub recent_tests: u64,
}

impl SuiteSummary {
    pub fn from_model(suite: test_suite::Model, total_tests: u64, recent_tests: u64) -> Self {
        SuiteSummary {
            id: suite.id,
            name: suite.name,
            file_path: suite.file_path,
            description: suite.description,
            created_at: suite.created_at,
            total_tests,
            recent_tests,
        }
    }
}

/// Landing page aggregates.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub total_runs: u64,
    pub total_suites: u64,
    pub total_tests: u64,
    pub recent_runs_count: u64,
    pub recent_success_rate: f64,
    pub latest_runs: Vec<RunSummary>,
    pub browser_stats: Vec<EngineStats>,
    pub active_suites: Vec<SuiteSummary>,
}

/// Daily buckets shaped for a chart widget.
#[derive(Debug, Default, PartialEq, Serialize, ToSchema)]
pub struct ChartData {
    /// Day labels formatted `dd/mm`.
    pub labels: Vec<String>,
    pub run_counts: Vec<u64>,
    pub success_rates: Vec<f64>,
}
