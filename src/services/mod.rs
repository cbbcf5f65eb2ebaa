//! Business logic services.

pub mod import;
pub mod reporting;

pub use import::{ImportPipeline, ImportSummary, ImportWarning};
