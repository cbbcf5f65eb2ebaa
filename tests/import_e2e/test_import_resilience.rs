//! E2E tests: fatal input errors and per-entry isolation.

use std::io::Write;
use std::path::Path;

use chrono::Utc;
use serde_json::json;

use testing_dashboard_lib::config::ImportDefaults;
use testing_dashboard_lib::error::AppError;
use testing_dashboard_lib::services::import::parser::{PlaywrightReport, PlaywrightStats};
use testing_dashboard_lib::services::{ImportPipeline, ImportWarning};

use super::test_helpers::*;

/// A missing report file fails with NotFound and persists nothing.
#[actix_rt::test]
async fn test_missing_file_is_not_found() {
    let pool = create_test_pool().await;
    let defaults = ImportDefaults::default();
    let dir = tempfile::tempdir().unwrap();

    let err = ImportPipeline::new(&pool, &defaults)
        .import_file(&dir.path().join("results.json"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)), "{:?}", err);
    assert_eq!(pool.count_runs().await.unwrap(), 0);
}

/// A directory is not a report file.
#[actix_rt::test]
async fn test_directory_is_not_found() {
    let pool = create_test_pool().await;
    let defaults = ImportDefaults::default();
    let dir = tempfile::tempdir().unwrap();

    let err = ImportPipeline::new(&pool, &defaults)
        .import_file(dir.path(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

/// Content that is not JSON fails with MalformedInput and persists nothing.
#[actix_rt::test]
async fn test_invalid_json_is_malformed() {
    let pool = create_test_pool().await;
    let defaults = ImportDefaults::default();

    for content in ["{\"stats\": ", "not json at all", "[1, 2, 3]", ""] {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();

        let err = ImportPipeline::new(&pool, &defaults)
            .import_file(file.path(), None)
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::MalformedInput(_)),
            "{:?} for {:?}",
            err,
            content
        );
    }

    assert_eq!(pool.count_runs().await.unwrap(), 0);
    assert!(pool.list_suites().await.unwrap().is_empty());
}

/// Non-UTF-8 bytes are malformed input.
#[actix_rt::test]
async fn test_non_utf8_is_malformed() {
    let pool = create_test_pool().await;
    let defaults = ImportDefaults::default();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[0x7b, 0xff, 0xfe, 0x7d]).unwrap();

    let err = ImportPipeline::new(&pool, &defaults)
        .import_file(Path::new(file.path()), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MalformedInput(_)));
    assert_eq!(pool.count_runs().await.unwrap(), 0);
}

/// A malformed test entry is reported and its siblings are still imported.
#[actix_rt::test]
async fn test_malformed_test_entry_is_isolated() {
    let pool = create_test_pool().await;
    let report = report_with(
        Utc::now(),
        2,
        0,
        0,
        json!([{
            "title": "Orders",
            "file": "orders.spec.ts",
            "specs": [{"tests": [
                test_entry("lists", "chromium", "passed", 1.0),
                {"title": "broken", "results": "not a list"},
                test_entry("filters", "chromium", "passed", 1.0)
            ]}]
        }]),
    );

    let summary = import(&pool, &report, None).await;
    assert_eq!(summary.imported_cases, 2);
    assert_eq!(summary.warnings.len(), 1);
    assert!(matches!(
        &summary.warnings[0],
        ImportWarning::MalformedEntry { path, .. } if path == "suites[0].specs[0].tests[1]"
    ));
}

/// A malformed suite entry does not stop later suites.
#[actix_rt::test]
async fn test_malformed_suite_entry_is_isolated() {
    let pool = create_test_pool().await;
    let report = report_with(
        Utc::now(),
        1,
        0,
        0,
        json!([
            "not a suite",
            {"title": "Ok", "file": "ok.spec.ts", "specs": [{"tests": [test_entry("works", "webkit", "passed", 1.0)]}]}
        ]),
    );

    let summary = import(&pool, &report, None).await;
    assert_eq!(summary.imported_cases, 1);
    assert_eq!(summary.suites_created, 1);
    assert!(matches!(
        &summary.warnings[..],
        [ImportWarning::MalformedEntry { path, .. }] if path == "suites[0]"
    ));
}

/// Unknown statuses are stored as failed and reported.
#[actix_rt::test]
async fn test_unknown_status_is_failed() {
    let pool = create_test_pool().await;
    let report = report_with(
        Utc::now(),
        0,
        1,
        0,
        json!([{
            "title": "Odd",
            "file": "odd.spec.ts",
            "specs": [{"tests": [test_entry("weird", "chromium", "exploded", 1.0)]}]
        }]),
    );

    let summary = import(&pool, &report, None).await;
    let cases = pool
        .get_cases_with_suite_by_run_id(summary.run_id())
        .await
        .unwrap();
    assert_eq!(cases[0].0.status, "failed");
    assert_eq!(
        summary.warnings,
        vec![ImportWarning::UnknownStatus {
            status: "exploded".to_string()
        }]
    );
}

/// Unparseable timestamps fall back to import time with a warning.
#[actix_rt::test]
async fn test_unparseable_timestamps() {
    let pool = create_test_pool().await;
    let report = json!({
        "stats": {"startTime": "last tuesday", "duration": 100, "expected": 1},
        "suites": [{
            "title": "Time",
            "file": "time.spec.ts",
            "specs": [{"tests": [{
                "title": "ticks",
                "projectName": "chromium",
                "results": [{"status": "passed", "startTime": "soon"}]
            }]}]
        }]
    });

    let before = Utc::now();
    let summary = import(&pool, &report, None).await;

    assert!(summary.run.started_at >= before - chrono::Duration::seconds(1));
    assert_eq!(summary.run.finished_at, Some(summary.run.started_at));
    assert_eq!(summary.run.duration_ms, 100);
    assert_eq!(
        summary.warnings,
        vec![
            ImportWarning::InvalidTimestamp {
                path: "stats.startTime".to_string(),
                value: "last tuesday".to_string()
            },
            ImportWarning::InvalidTimestamp {
                path: "suites[0].specs[0].tests[0]".to_string(),
                value: "soon".to_string()
            },
        ]
    );
}

/// A duration whose finish time cannot be represented pins the finish to the
/// start and warns, instead of leaving a half-finalized run.
#[actix_rt::test]
async fn test_duration_out_of_range_pins_finish() {
    let pool = create_test_pool().await;
    let report = json!({
        "stats": {"startTime": "2025-07-25T01:27:10.160Z", "duration": 1e18, "expected": 1}
    });

    let summary = import(&pool, &report, None).await;

    let start = "2025-07-25T01:27:10.160Z"
        .parse::<chrono::DateTime<Utc>>()
        .unwrap();
    assert_eq!(summary.run.started_at, start);
    assert_eq!(summary.run.finished_at, Some(start));
    assert_eq!(summary.run.duration_ms, 0);
    assert!(
        summary
            .warnings
            .iter()
            .any(|w| matches!(w, ImportWarning::DurationOutOfRange { .. })),
        "{:?}",
        summary.warnings
    );

    let stored = pool.get_run_by_id(summary.run_id()).await.unwrap().unwrap();
    assert_eq!(stored.finished_at, Some(start));
    assert_eq!(pool.count_runs().await.unwrap(), 1);
}

/// Stats counts that are negative or overflow the run total are rejected
/// before any run is written.
#[actix_rt::test]
async fn test_invalid_stats_counts_are_malformed() {
    let pool = create_test_pool().await;
    let defaults = ImportDefaults::default();

    for stats in [
        json!({"expected": 2147483647, "unexpected": 0, "skipped": 1}),
        json!({"expected": 5, "unexpected": -2}),
    ] {
        let file = write_report(&json!({"stats": stats}));
        let err = ImportPipeline::new(&pool, &defaults)
            .import_file(file.path(), None)
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::MalformedInput(_)),
            "{:?} for {}",
            err,
            stats
        );
    }

    assert_eq!(pool.count_runs().await.unwrap(), 0);
}

/// Already-parsed reports get the same count check.
#[actix_rt::test]
async fn test_parsed_report_with_bad_counts_is_rejected() {
    let pool = create_test_pool().await;
    let defaults = ImportDefaults::default();
    let report = PlaywrightReport {
        stats: PlaywrightStats {
            expected: Some(i32::MAX),
            skipped: Some(1),
            ..Default::default()
        },
        config: json!({}),
        suites: Vec::new(),
    };

    let err = ImportPipeline::new(&pool, &defaults)
        .import_report(report, None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::MalformedInput(_)));
    assert_eq!(pool.count_runs().await.unwrap(), 0);
}
