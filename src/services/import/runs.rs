//! Run aggregation: the provisional run row and its final timing update.
//!
//! A run is written twice. `create_run` persists it before any case exists,
//! with counters and status fixed from the report statistics and
//! `finished_at == started_at` as a placeholder. `finalize_run` runs after
//! every suite has been walked and writes the real finish time and duration.
//! Nothing touches the row afterwards.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use tracing::info;
use uuid::Uuid;

use crate::db::DbPool;
use crate::db::test_runs::NewTestRun;
use crate::entity::test_run;
use crate::error::{AppError, AppResult};
use crate::models::RunStatus;

use super::parser::PlaywrightStats;
use super::time::{self, TimeSource};

/// Build the provisional run row from report-level statistics.
///
/// Fails with `MalformedInput` when the counts cannot form a run total.
pub fn provisional_run(
    stats: &PlaywrightStats,
    config: JsonValue,
    executed_by: Option<Uuid>,
    now: DateTime<Utc>,
) -> AppResult<(NewTestRun, TimeSource)> {
    let total_tests = stats.total().ok_or_else(|| {
        AppError::MalformedInput(
            "Test counts must be non-negative and fit the run total".to_string(),
        )
    })?;
    let expected = stats.expected();
    let unexpected = stats.unexpected();
    let (started_at, source) = time::resolve_instant(stats.start_time.as_deref(), now);

    let run = NewTestRun {
        executed_by,
        status: RunStatus::from_counts(expected, unexpected),
        started_at,
        finished_at: Some(started_at),
        duration_ms: time::duration_ms(stats.duration),
        total_tests,
        passed_tests: expected,
        failed_tests: unexpected,
        skipped_tests: stats.skipped(),
        config,
    };

    Ok((run, source))
}

/// Finish time resolved once all cases are in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishTime {
    /// No usable start time in the report; the placeholder stays.
    Placeholder,
    /// `start + duration`.
    At(DateTime<Utc>),
    /// `start + duration` is out of range; the finish is pinned to the start
    /// and the duration recorded as zero.
    OutOfRange(DateTime<Utc>),
}

impl FinishTime {
    fn instant(self) -> Option<DateTime<Utc>> {
        match self {
            FinishTime::Placeholder => None,
            FinishTime::At(at) | FinishTime::OutOfRange(at) => Some(at),
        }
    }
}

pub fn final_finish_time(stats: &PlaywrightStats) -> FinishTime {
    let Some(start) = stats.start_time.as_deref().and_then(time::parse_timestamp) else {
        return FinishTime::Placeholder;
    };
    match time::finish_time(start, time::duration_ms(stats.duration)) {
        Some(at) => FinishTime::At(at),
        None => FinishTime::OutOfRange(start),
    }
}

/// Creates and finalizes the run row of one import.
pub struct RunAggregator<'a> {
    pool: &'a DbPool,
}

impl<'a> RunAggregator<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Persist the provisional run. Returns the stored row and where its start
    /// time came from.
    pub async fn create_run(
        &self,
        stats: &PlaywrightStats,
        config: JsonValue,
        executed_by: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> AppResult<(test_run::Model, TimeSource)> {
        let (new_run, source) = provisional_run(stats, config, executed_by, now)?;
        let run = self.pool.insert_run(new_run).await?;

        info!(
            run_id = %run.id,
            status = %run.status,
            total = run.total_tests,
            passed = run.passed_tests,
            failed = run.failed_tests,
            skipped = run.skipped_tests,
            "Test run created"
        );

        Ok((run, source))
    }

    /// Write the final finish time and duration.
    pub async fn finalize_run(
        &self,
        run: &test_run::Model,
        stats: &PlaywrightStats,
    ) -> AppResult<(test_run::Model, FinishTime)> {
        let finish = final_finish_time(stats);
        let duration_ms = match finish {
            FinishTime::OutOfRange(_) => 0,
            _ => time::duration_ms(stats.duration),
        };

        let updated = self
            .pool
            .update_run_timing(run.id, finish.instant(), duration_ms)
            .await?;

        Ok((updated, finish))
    }
}
