//! E2E tests: reading imported data back through the reporting API.

use chrono::{Duration, Utc};
use serde_json::json;

use super::test_helpers::*;

/// Two recent runs (one failed) and one old passing run.
async fn seed(pool: &testing_dashboard_lib::db::DbPool) -> (String, String, String) {
    let recent = Utc::now() - Duration::hours(1);
    let old = Utc::now() - Duration::days(400);

    let failed = import(
        pool,
        &report_with(
            recent,
            1,
            1,
            0,
            json!([
                {"title": "Login", "file": "login.spec.ts", "specs": [{"tests": [
                    test_entry("logs in", "chromium", "passed", 100.0),
                    test_entry("logs out", "firefox", "failed", 300.0)
                ]}]},
                {"title": "Cart", "file": "cart.spec.ts", "specs": [{"tests": [
                    test_entry("adds", "chromium", "passed", 200.0)
                ]}]}
            ]),
        ),
        None,
    )
    .await;

    let passed = import(
        pool,
        &report_with(
            recent,
            1,
            0,
            0,
            json!([{"title": "Login", "file": "login.spec.ts", "specs": [{"tests": [
                test_entry("logs in", "webkit", "passed", 50.0)
            ]}]}]),
        ),
        None,
    )
    .await;

    let old_run = import(
        pool,
        &report_with(
            old,
            1,
            0,
            0,
            json!([{"title": "Legacy", "file": "legacy.spec.ts", "specs": [{"tests": [
                test_entry("still works", "chromium", "passed", 10.0)
            ]}]}]),
        ),
        None,
    )
    .await;

    (
        failed.run_id().to_string(),
        passed.run_id().to_string(),
        old_run.run_id().to_string(),
    )
}

#[actix_rt::test]
async fn test_health_and_ready() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let (status, body) = get_json(&app, "/api/v1/health").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");

    let (status, body) = get_json(&app, "/api/v1/ready").await;
    assert_eq!(status, 200);
    assert_eq!(body["database"], "connected");
}

#[actix_rt::test]
async fn test_list_runs_newest_first_with_filters() {
    let pool = create_test_pool().await;
    let (failed_id, _passed_id, old_id) = seed(&pool).await;
    let app = create_test_app(&pool).await;

    let (status, body) = get_json(&app, "/api/v1/runs").await;
    assert_eq!(status, 200);
    let runs = body["runs"].as_array().unwrap();
    assert_eq!(runs.len(), 3);
    assert_eq!(runs[2]["id"], old_id.as_str());
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["limit"], 20);

    let (status, body) = get_json(&app, "/api/v1/runs?status=failed").await;
    assert_eq!(status, 200);
    let runs = body["runs"].as_array().unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0]["id"], failed_id.as_str());
    assert_eq!(runs[0]["success_rate"], 50.0);

    let today = Utc::now().date_naive();
    let from = (today - Duration::days(2)).format("%Y-%m-%d");
    let (status, body) = get_json(&app, &format!("/api/v1/runs?date_from={}", from)).await;
    assert_eq!(status, 200);
    assert_eq!(body["pagination"]["total"], 2);

    let to = (today - Duration::days(30)).format("%Y-%m-%d");
    let (status, body) = get_json(&app, &format!("/api/v1/runs?date_to={}", to)).await;
    assert_eq!(status, 200);
    assert_eq!(body["runs"][0]["id"], old_id.as_str());
    assert_eq!(body["pagination"]["total"], 1);
}

#[actix_rt::test]
async fn test_list_runs_pagination() {
    let pool = create_test_pool().await;
    seed(&pool).await;
    let app = create_test_app(&pool).await;

    let (status, body) = get_json(&app, "/api/v1/runs?page=2&limit=2").await;
    assert_eq!(status, 200);
    assert_eq!(body["runs"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["page"], 2);
    assert_eq!(body["pagination"]["total_pages"], 2);
}

#[actix_rt::test]
async fn test_list_runs_rejects_bad_filters() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let (status, body) = get_json(&app, "/api/v1/runs?status=exploded").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");

    let (status, _) =
        get_json(&app, "/api/v1/runs?date_from=2025-07-10&date_to=2025-07-01").await;
    assert_eq!(status, 400);
}

#[actix_rt::test]
async fn test_run_detail_groups_cases_by_suite() {
    let pool = create_test_pool().await;
    let (failed_id, _, _) = seed(&pool).await;
    let app = create_test_app(&pool).await;

    let (status, body) = get_json(&app, &format!("/api/v1/runs/{}", failed_id)).await;
    assert_eq!(status, 200, "{:?}", body);
    assert_eq!(body["run"]["status"], "failed");
    assert_eq!(body["config"], json!({"workers": 2}));

    let suites = body["suites"].as_array().unwrap();
    let names: Vec<_> = suites.iter().map(|s| s["suite_name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Cart", "Login"]);
    assert_eq!(suites[1]["cases"].as_array().unwrap().len(), 2);

    let stats = body["browser_stats"].as_array().unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0]["browser"], "chromium");
    assert_eq!(stats[0]["count"], 2);
    assert_eq!(stats[0]["passed"], 2);
    assert_eq!(stats[0]["avg_duration_ms"], 150.0);
    assert_eq!(stats[1]["browser"], "firefox");
    assert_eq!(stats[1]["failed"], 1);
}

#[actix_rt::test]
async fn test_run_detail_keeps_same_titled_suites_apart() {
    let pool = create_test_pool().await;
    let summary = import(
        &pool,
        &report_with(
            Utc::now(),
            2,
            0,
            0,
            json!([
                {"title": "smoke", "file": "b.spec.ts",
                 "specs": [{"tests": [test_entry("b1", "chromium", "passed", 100.0)]}]},
                {"title": "smoke", "file": "a.spec.ts",
                 "specs": [{"tests": [test_entry("a1", "chromium", "passed", 100.0)]}]}
            ]),
        ),
        None,
    )
    .await;
    let app = create_test_app(&pool).await;

    let (status, body) = get_json(&app, &format!("/api/v1/runs/{}", summary.run_id())).await;
    assert_eq!(status, 200, "{:?}", body);

    let suites = body["suites"].as_array().unwrap();
    assert_eq!(suites.len(), 2, "{:?}", suites);
    assert_eq!(suites[0]["suite_name"], "smoke");
    assert_eq!(suites[0]["file_path"], "a.spec.ts");
    assert_eq!(suites[1]["file_path"], "b.spec.ts");
    assert_ne!(suites[0]["suite_id"], suites[1]["suite_id"]);

    let titles = |group: &serde_json::Value| -> Vec<String> {
        group["cases"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["title"].as_str().unwrap().to_string())
            .collect()
    };
    assert_eq!(titles(&suites[0]), vec!["a1"]);
    assert_eq!(titles(&suites[1]), vec!["b1"]);
}

#[actix_rt::test]
async fn test_run_detail_errors() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let (status, body) = get_json(&app, "/api/v1/runs/not-a-uuid").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");

    let (status, body) = get_json(
        &app,
        "/api/v1/runs/0190d3a1-0000-7000-8000-000000000000",
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[actix_rt::test]
async fn test_list_suites_with_counts() {
    let pool = create_test_pool().await;
    seed(&pool).await;
    let app = create_test_app(&pool).await;

    let (status, body) = get_json(&app, "/api/v1/suites").await;
    assert_eq!(status, 200);
    let suites = body.as_array().unwrap();
    let rows: Vec<_> = suites
        .iter()
        .map(|s| {
            (
                s["name"].as_str().unwrap(),
                s["total_tests"].as_u64().unwrap(),
                s["recent_tests"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![("Cart", 1, 1), ("Legacy", 1, 0), ("Login", 3, 3)]
    );
}

#[actix_rt::test]
async fn test_dashboard_summary() {
    let pool = create_test_pool().await;
    seed(&pool).await;
    let app = create_test_app(&pool).await;

    let (status, body) = get_json(&app, "/api/v1/dashboard").await;
    assert_eq!(status, 200);
    assert_eq!(body["total_runs"], 3);
    assert_eq!(body["total_suites"], 3);
    assert_eq!(body["total_tests"], 5);
    assert_eq!(body["recent_runs_count"], 2);
    // 2 passed of 3 recent tests
    assert_eq!(body["recent_success_rate"], 66.67);
    assert_eq!(body["latest_runs"].as_array().unwrap().len(), 3);

    let engines = body["browser_stats"].as_array().unwrap();
    assert_eq!(engines[0]["browser"], "chromium");
    assert_eq!(engines[0]["count"], 3);

    let active = body["active_suites"].as_array().unwrap();
    assert_eq!(active[0]["name"], "Login");
    assert_eq!(active.last().unwrap()["name"], "Legacy");
}

#[actix_rt::test]
async fn test_daily_stats() {
    let pool = create_test_pool().await;
    seed(&pool).await;
    let app = create_test_app(&pool).await;

    let (status, body) = get_json(&app, "/api/v1/stats?days=7").await;
    assert_eq!(status, 200);
    assert_eq!(body["labels"].as_array().unwrap().len(), 1);
    assert_eq!(body["run_counts"], json!([2]));
    assert_eq!(body["success_rates"], json!([66.67]));

    let (status, _) = get_json(&app, "/api/v1/stats?days=0").await;
    assert_eq!(status, 400);
}

#[actix_rt::test]
async fn test_empty_store() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let (status, body) = get_json(&app, "/api/v1/dashboard").await;
    assert_eq!(status, 200);
    assert_eq!(body["total_runs"], 0);
    assert_eq!(body["recent_success_rate"], 0.0);

    let (status, body) = get_json(&app, "/api/v1/stats").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"labels": [], "run_counts": [], "success_rates": []}));
}
