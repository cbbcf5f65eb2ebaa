//! Database queries for test runs.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::entity::test_run::{self, ActiveModel, Entity as TestRun};
use crate::entity::user;
use crate::error::{AppError, AppResult};
use crate::models::{RunListQuery, RunStatus};

use super::DbPool;

/// Run row written at the start of an import.
#[derive(Debug, Clone)]
pub struct NewTestRun {
    pub executed_by: Option<Uuid>,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_ms: i64,
    pub total_tests: i32,
    pub passed_tests: i32,
    pub failed_tests: i32,
    pub skipped_tests: i32,
    pub config: JsonValue,
}

/// Midnight UTC at the start of `date`.
pub(crate) fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

impl DbPool {
    /// Insert a new run in its own transaction.
    pub async fn insert_run(&self, run: NewTestRun) -> AppResult<test_run::Model> {
        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            executed_by: Set(run.executed_by),
            status: Set(run.status.as_str().to_string()),
            started_at: Set(run.started_at),
            finished_at: Set(run.finished_at),
            duration_ms: Set(run.duration_ms),
            total_tests: Set(run.total_tests),
            passed_tests: Set(run.passed_tests),
            failed_tests: Set(run.failed_tests),
            skipped_tests: Set(run.skipped_tests),
            config: Set(run.config),
            created_at: Set(Utc::now()),
        };

        let txn = self.connection().begin().await?;
        let result = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert test run: {}", e)))?;
        txn.commit().await?;

        Ok(result)
    }

    /// Get a run by ID.
    pub async fn get_run_by_id(&self, id: Uuid) -> AppResult<Option<test_run::Model>> {
        let result = TestRun::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get test run: {}", e)))?;

        Ok(result)
    }

    /// Get a run together with the user who imported it.
    pub async fn get_run_with_user(
        &self,
        id: Uuid,
    ) -> AppResult<Option<(test_run::Model, Option<user::Model>)>> {
        let result = TestRun::find_by_id(id)
            .find_also_related(user::Entity)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get test run: {}", e)))?;

        Ok(result)
    }

    /// Write the corrected finish time and duration of a run.
    ///
    /// `finished_at = None` leaves the stored value untouched.
    pub async fn update_run_timing(
        &self,
        id: Uuid,
        finished_at: Option<DateTime<Utc>>,
        duration_ms: i64,
    ) -> AppResult<test_run::Model> {
        let run = self
            .get_run_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Run {}", id)))?;

        let mut active: ActiveModel = run.into();
        if let Some(finished_at) = finished_at {
            active.finished_at = Set(Some(finished_at));
        }
        active.duration_ms = Set(duration_ms);

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update test run: {}", e)))?;

        Ok(result)
    }

    /// Delete a run. Its cases go with it.
    pub async fn delete_run(&self, id: Uuid) -> AppResult<bool> {
        let result = TestRun::delete_by_id(id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete test run: {}", e)))?;

        Ok(result.rows_affected > 0)
    }

    /// Query runs with filters and pagination, newest first.
    pub async fn query_runs(
        &self,
        query: &RunListQuery,
    ) -> AppResult<(Vec<(test_run::Model, Option<user::Model>)>, u64)> {
        let mut select = TestRun::find();

        if let Some(ref status) = query.status {
            select = select.filter(test_run::Column::Status.eq(status.as_str()));
        }
        if let Some(from) = query.date_from {
            select = select.filter(test_run::Column::StartedAt.gte(day_start(from)));
        }
        if let Some(next_day) = query.date_to.and_then(|d| d.succ_opt()) {
            select = select.filter(test_run::Column::StartedAt.lt(day_start(next_day)));
        }

        // Count total before pagination
        let total = select
            .clone()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count test runs: {}", e)))?;

        let pagination = query.pagination();
        let rows = select
            .order_by_desc(test_run::Column::StartedAt)
            .offset(u64::from(pagination.offset()))
            .limit(u64::from(pagination.clamped_limit()))
            .find_also_related(user::Entity)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to query test runs: {}", e)))?;

        Ok((rows, total))
    }

    /// Runs started at or after `since`.
    pub async fn runs_since(&self, since: DateTime<Utc>) -> AppResult<Vec<test_run::Model>> {
        let result = TestRun::find()
            .filter(test_run::Column::StartedAt.gte(since))
            .order_by_asc(test_run::Column::StartedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get recent test runs: {}", e)))?;

        Ok(result)
    }

    /// Count all runs.
    pub async fn count_runs(&self) -> AppResult<u64> {
        let total = TestRun::find()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count test runs: {}", e)))?;

        Ok(total)
    }
}
