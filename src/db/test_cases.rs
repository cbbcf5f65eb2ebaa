//! Database queries for test cases.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::entity::test_case::{self, ActiveModel, Entity as TestCase};
use crate::entity::test_suite;
use crate::error::{AppError, AppResult};
use crate::models::{CaseStatus, Engine};

use super::DbPool;

/// Represents a test case to be inserted.
#[derive(Debug, Clone)]
pub struct NewTestCase {
    pub run_id: Uuid,
    pub suite_id: Uuid,
    pub title: String,
    pub status: CaseStatus,
    pub browser: Engine,
    pub duration_ms: i64,
    pub retry_count: i32,
    pub error_message: Option<String>,
    pub error_stack: Option<String>,
    pub attachments: JsonValue,
    pub annotations: JsonValue,
    pub worker_index: Option<i32>,
    pub started_at: DateTime<Utc>,
}

impl DbPool {
    /// Insert a new test case.
    pub async fn insert_test_case(&self, test_case: NewTestCase) -> AppResult<test_case::Model> {
        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            test_run_id: Set(test_case.run_id),
            test_suite_id: Set(test_case.suite_id),
            title: Set(test_case.title),
            status: Set(test_case.status.as_str().to_string()),
            browser: Set(test_case.browser.as_str().to_string()),
            duration_ms: Set(test_case.duration_ms),
            retry_count: Set(test_case.retry_count),
            error_message: Set(test_case.error_message),
            error_stack: Set(test_case.error_stack),
            attachments: Set(test_case.attachments),
            annotations: Set(test_case.annotations),
            worker_index: Set(test_case.worker_index),
            started_at: Set(test_case.started_at),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert test case: {}", e)))?;

        Ok(result)
    }

    /// Get test cases of a run together with their suite, ordered by start time.
    pub async fn get_cases_with_suite_by_run_id(
        &self,
        run_id: Uuid,
    ) -> AppResult<Vec<(test_case::Model, Option<test_suite::Model>)>> {
        let result = TestCase::find()
            .filter(test_case::Column::TestRunId.eq(run_id))
            .order_by_asc(test_case::Column::StartedAt)
            .order_by_asc(test_case::Column::Id)
            .find_also_related(test_suite::Entity)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get test cases by run: {}", e)))?;

        Ok(result)
    }

    /// Count test cases, optionally restricted to one run.
    pub async fn count_test_cases(&self, run_id: Option<Uuid>) -> AppResult<u64> {
        let mut select = TestCase::find();
        if let Some(run_id) = run_id {
            select = select.filter(test_case::Column::TestRunId.eq(run_id));
        }

        let total = select
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count test cases: {}", e)))?;

        Ok(total)
    }
}
