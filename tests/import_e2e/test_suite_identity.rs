//! Suite get-or-create under concurrent callers.

use futures_util::future::join_all;

use testing_dashboard_lib::db::test_suites::NewTestSuite;

use crate::test_helpers::create_file_pool;

fn checkout_suite() -> NewTestSuite {
    NewTestSuite {
        name: "Checkout".to_string(),
        file_path: "checkout.spec.ts".to_string(),
        description: Some("Test suite for Checkout".to_string()),
    }
}

#[actix_rt::test]
async fn test_concurrent_get_or_create_yields_one_suite() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let pool = create_file_pool(&dir, 4).await;

    let results = join_all((0..8).map(|_| pool.get_or_create_suite(checkout_suite()))).await;

    let resolved: Vec<_> = results
        .into_iter()
        .map(|r| r.expect("get_or_create_suite should succeed"))
        .collect();

    let created = resolved.iter().filter(|(_, created)| *created).count();
    assert_eq!(created, 1, "exactly one caller should insert the suite");

    let first_id = resolved[0].0.id;
    assert!(resolved.iter().all(|(suite, _)| suite.id == first_id));

    let suites = pool.list_suites().await.unwrap();
    assert_eq!(suites.len(), 1);
    assert_eq!(suites[0].id, first_id);
    assert_eq!(suites[0].name, "Checkout");
    assert_eq!(suites[0].file_path, "checkout.spec.ts");
}

#[actix_rt::test]
async fn test_get_or_create_returns_existing_suite() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let pool = create_file_pool(&dir, 2).await;

    let (first, created) = pool.get_or_create_suite(checkout_suite()).await.unwrap();
    assert!(created);

    let (second, created) = pool.get_or_create_suite(checkout_suite()).await.unwrap();
    assert!(!created);
    assert_eq!(second.id, first.id);
    assert_eq!(second.description.as_deref(), Some("Test suite for Checkout"));

    let mut other_file = checkout_suite();
    other_file.file_path = "checkout-mobile.spec.ts".to_string();
    let (third, created) = pool.get_or_create_suite(other_file).await.unwrap();
    assert!(created);
    assert_ne!(third.id, first.id);
}
