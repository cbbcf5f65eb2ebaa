//! Shared helpers for import E2E tests.

use std::io::Write;

use actix_web::{App, dev::ServiceResponse, test, web};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tempfile::{NamedTempFile, TempDir};

use testing_dashboard_lib::api::{self, ReportingSettings};
use testing_dashboard_lib::config::ImportDefaults;
use testing_dashboard_lib::db::DbPool;
use testing_dashboard_lib::services::{ImportPipeline, ImportSummary};

/// Create a fresh, migrated in-memory store. Every call gets its own database.
pub async fn create_test_pool() -> DbPool {
    let pool = DbPool::connect("sqlite::memory:", 1, 1)
        .await
        .expect("Failed to open in-memory database");
    pool.run_migrations()
        .await
        .expect("Failed to run migrations");
    pool
}

/// Create a migrated SQLite store in a file under `dir`, shared by up to
/// `max_connections` pooled connections.
pub async fn create_file_pool(dir: &TempDir, max_connections: u32) -> DbPool {
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("dashboard.db").display());
    let pool = DbPool::connect(&url, max_connections, 1)
        .await
        .expect("Failed to open file database");
    pool.run_migrations()
        .await
        .expect("Failed to run migrations");
    pool
}

/// Write `report` to a temporary `results.json`.
pub fn write_report(report: &Value) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("results")
        .suffix(".json")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(report.to_string().as_bytes())
        .expect("Failed to write report");
    file
}

/// Import `report` through a temporary file, the way the CLI does.
pub async fn import(pool: &DbPool, report: &Value, actor: Option<&str>) -> ImportSummary {
    let file = write_report(report);
    let defaults = ImportDefaults::default();
    ImportPipeline::new(pool, &defaults)
        .import_file(file.path(), actor)
        .await
        .expect("Import should succeed")
}

/// The smallest useful report: one passing chromium test in suite "Login".
pub fn minimal_report() -> Value {
    json!({
        "stats": {"expected": 2, "unexpected": 0, "skipped": 0, "duration": 1500},
        "suites": [{
            "title": "Login",
            "file": "login.spec.ts",
            "specs": [{"tests": [{
                "title": "logs in",
                "projectName": "chromium",
                "results": [{"status": "passed", "duration": 500}]
            }]}]
        }]
    })
}

/// A test entry with a single result.
pub fn test_entry(title: &str, project: &str, status: &str, duration: f64) -> Value {
    json!({
        "title": title,
        "projectName": project,
        "results": [{"status": status, "duration": duration, "retry": 0}]
    })
}

/// A report with explicit stats, start time and suites.
pub fn report_with(
    start: DateTime<Utc>,
    expected: i32,
    unexpected: i32,
    skipped: i32,
    suites: Value,
) -> Value {
    json!({
        "config": {"workers": 2},
        "stats": {
            "startTime": start.to_rfc3339(),
            "duration": 2500.75,
            "expected": expected,
            "unexpected": unexpected,
            "skipped": skipped
        },
        "suites": suites
    })
}

/// Create a test app serving the reporting API under `/api/v1`.
pub async fn create_test_app(
    pool: &DbPool,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(ReportingSettings::default()))
            .service(web::scope("/api/v1").configure(api::configure_routes)),
    )
    .await
}

/// GET `uri` and return the status and JSON body.
pub async fn get_json<S>(app: &S, uri: &str) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::get().uri(uri).to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let body = test::read_body(resp).await;
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}
