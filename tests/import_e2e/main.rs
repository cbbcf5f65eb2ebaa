//! Import pipeline E2E test suite.
//!
//! Imports Playwright reports into SQLite stores (in-memory, or file-backed
//! where several connections are needed) and checks the
//! persisted runs, suites and cases, then reads them back through the
//! reporting API.
//!
//! Run with: cargo test --test import_e2e

mod test_helpers;

mod test_import_resilience;
mod test_reporting_api;
mod test_suite_identity;
