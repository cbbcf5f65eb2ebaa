//! Reporting read layer.
//!
//! Aggregation is done in Rust over narrow projections so the same code runs
//! on PostgreSQL and SQLite.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::db::DbPool;
use crate::db::reporting::EngineRow;
use crate::entity::test_run;
use crate::error::{AppError, AppResult};
use crate::models::{
    CaseResponse, CaseStatus, ChartData, DashboardSummary, EngineStats, Pagination, RunDetail,
    RunListQuery, RunListResponse, RunStatus, RunSummary, SuiteGroup, SuiteSummary, success_rate,
};

/// Entries shown in the dashboard's "latest runs" and "active suites" lists.
pub const DASHBOARD_LIST_LEN: usize = 5;

/// Upper bound accepted for chart and recent-window lookbacks.
pub const MAX_LOOKBACK_DAYS: u32 = 366;

/// Ordering applied to engine statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineOrder {
    /// Alphabetical by engine name.
    ByBrowser,
    /// Most cases first, ties broken by name.
    ByCountDesc,
}

/// Aggregate `(browser, status, duration)` rows into per-engine statistics.
pub fn aggregate_engine_stats(rows: &[EngineRow], order: EngineOrder) -> Vec<EngineStats> {
    #[derive(Default)]
    struct Acc {
        count: u64,
        passed: u64,
        failed: u64,
        duration_sum: i128,
    }

    let mut by_engine: BTreeMap<&str, Acc> = BTreeMap::new();
    for (browser, status, duration_ms) in rows {
        let acc = by_engine.entry(browser.as_str()).or_default();
        acc.count += 1;
        acc.duration_sum += i128::from(*duration_ms);
        if status == CaseStatus::Passed.as_str() {
            acc.passed += 1;
        } else if status == CaseStatus::Failed.as_str() {
            acc.failed += 1;
        }
    }

    let mut stats: Vec<EngineStats> = by_engine
        .into_iter()
        .map(|(browser, acc)| EngineStats {
            browser: browser.to_string(),
            count: acc.count,
            passed: acc.passed,
            failed: acc.failed,
            avg_duration_ms: round2(acc.duration_sum as f64 / acc.count as f64),
        })
        .collect();

    if order == EngineOrder::ByCountDesc {
        // Stable sort keeps alphabetical order among equal counts.
        stats.sort_by(|a, b| b.count.cmp(&a.count));
    }
    stats
}

/// Bucket runs by UTC start day. Days without runs produce no bucket.
pub fn bucket_daily(runs: &[test_run::Model]) -> ChartData {
    let mut days: BTreeMap<NaiveDate, (u64, i64, i64)> = BTreeMap::new();
    for run in runs {
        let day = days.entry(run.started_at.date_naive()).or_default();
        day.0 += 1;
        day.1 += i64::from(run.passed_tests);
        day.2 += i64::from(run.total_tests);
    }

    let mut chart = ChartData::default();
    for (day, (count, passed, total)) in days {
        chart.labels.push(day.format("%d/%m").to_string());
        chart.run_counts.push(count);
        chart.success_rates.push(success_rate(passed, total));
    }
    chart
}

/// Success rate over several runs: total passed over total tests.
pub fn combined_success_rate(runs: &[test_run::Model]) -> f64 {
    let (passed, total) = runs.iter().fold((0i64, 0i64), |(p, t), run| {
        (p + i64::from(run.passed_tests), t + i64::from(run.total_tests))
    });
    success_rate(passed, total)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn validate_days(days: u32) -> AppResult<u32> {
    if days == 0 || days > MAX_LOOKBACK_DAYS {
        return Err(AppError::InvalidInput(format!(
            "days must be between 1 and {}",
            MAX_LOOKBACK_DAYS
        )));
    }
    Ok(days)
}

fn window_start(days: u32) -> DateTime<Utc> {
    Utc::now() - Duration::days(i64::from(days))
}

/// Filtered, paginated run list, newest first.
pub async fn list_runs(pool: &DbPool, query: &RunListQuery) -> AppResult<RunListResponse> {
    if let Some(status) = query.status.as_deref()
        && RunStatus::parse(status).is_none()
    {
        return Err(AppError::InvalidInput(format!(
            "Unknown run status '{}'",
            status
        )));
    }
    if let (Some(from), Some(to)) = (query.date_from, query.date_to)
        && from > to
    {
        return Err(AppError::InvalidInput(
            "date_from must not be after date_to".to_string(),
        ));
    }

    let (rows, total) = pool.query_runs(query).await?;
    let pagination = query.pagination();

    Ok(RunListResponse {
        runs: rows
            .into_iter()
            .map(|(run, user)| RunSummary::from_model(run, user.map(|u| u.username)))
            .collect(),
        pagination: Pagination::new(pagination.page(), pagination.clamped_limit(), total),
    })
}

/// A run with its cases grouped by suite and per-engine statistics. Groups
/// are ordered by suite name, then file path.
pub async fn run_detail(pool: &DbPool, run_id: Uuid) -> AppResult<RunDetail> {
    let (run, user) = pool
        .get_run_with_user(run_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Run {}", run_id)))?;

    let cases = pool.get_cases_with_suite_by_run_id(run_id).await?;

    // Keyed by suite identity; describe titles repeat across files.
    let mut groups: BTreeMap<(String, String), SuiteGroup> = BTreeMap::new();
    for (case, suite) in cases {
        let Some(suite) = suite else {
            debug!(case_id = %case.id, "Case without suite, skipping");
            continue;
        };
        groups
            .entry((suite.name.clone(), suite.file_path.clone()))
            .or_insert_with(|| SuiteGroup {
                suite_id: suite.id,
                suite_name: suite.name.clone(),
                file_path: suite.file_path.clone(),
                cases: Vec::new(),
            })
            .cases
            .push(CaseResponse::from(case));
    }

    let rows = pool.engine_rows(Some(run_id)).await?;
    let config = run.config.clone();

    Ok(RunDetail {
        run: RunSummary::from_model(run, user.map(|u| u.username)),
        config,
        suites: groups.into_values().collect(),
        browser_stats: aggregate_engine_stats(&rows, EngineOrder::ByBrowser),
    })
}

/// All suites ordered by name, with total and recent case counts.
pub async fn list_suites_with_counts(
    pool: &DbPool,
    recent_days: u32,
) -> AppResult<Vec<SuiteSummary>> {
    let recent_days = validate_days(recent_days)?;
    let suites = pool.list_suites().await?;
    let totals = pool.suite_case_counts(None).await?;
    let recent = pool
        .suite_case_counts(Some(window_start(recent_days)))
        .await?;

    Ok(suites
        .into_iter()
        .map(|suite| {
            let total = count_for(&totals, suite.id);
            let recent = count_for(&recent, suite.id);
            SuiteSummary::from_model(suite, total, recent)
        })
        .collect())
}

fn count_for(counts: &HashMap<Uuid, u64>, id: Uuid) -> u64 {
    counts.get(&id).copied().unwrap_or(0)
}

/// Landing page aggregates over the whole store and the recent window.
pub async fn dashboard_summary(pool: &DbPool, recent_days: u32) -> AppResult<DashboardSummary> {
    let recent_days = validate_days(recent_days)?;

    let total_runs = pool.count_runs().await?;
    let total_tests = pool.count_test_cases(None).await?;
    let recent_runs = pool.runs_since(window_start(recent_days)).await?;

    let latest = pool
        .query_runs(&RunListQuery {
            limit: Some(DASHBOARD_LIST_LEN as u32),
            ..Default::default()
        })
        .await?
        .0;

    let engine_rows = pool.engine_rows(None).await?;

    let mut suites = list_suites_with_counts(pool, recent_days).await?;
    let total_suites = suites.len() as u64;
    suites.sort_by(|a, b| b.recent_tests.cmp(&a.recent_tests));
    suites.truncate(DASHBOARD_LIST_LEN);

    Ok(DashboardSummary {
        total_runs,
        total_suites,
        total_tests,
        recent_runs_count: recent_runs.len() as u64,
        recent_success_rate: combined_success_rate(&recent_runs),
        latest_runs: latest
            .into_iter()
            .map(|(run, user)| RunSummary::from_model(run, user.map(|u| u.username)))
            .collect(),
        browser_stats: aggregate_engine_stats(&engine_rows, EngineOrder::ByCountDesc),
        active_suites: suites,
    })
}

/// Daily run counts and success rates over the last `days` days.
pub async fn daily_stats(pool: &DbPool, days: u32) -> AppResult<ChartData> {
    let days = validate_days(days)?;
    let runs = pool.runs_since(window_start(days)).await?;
    Ok(bucket_daily(&runs))
}
