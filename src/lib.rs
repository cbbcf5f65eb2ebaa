//! Testing dashboard library.
//!
//! Imports Playwright JSON reports into persisted suites, runs and cases, and
//! exposes the read queries and HTTP API used for reporting on them.

pub mod api;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
