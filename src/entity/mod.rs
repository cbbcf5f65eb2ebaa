//! SeaORM entity definitions.

pub mod test_case;
pub mod test_run;
pub mod test_suite;
pub mod user;
