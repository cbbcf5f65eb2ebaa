//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20250725_000001_create_users;
mod m20250725_000002_create_test_suites;
mod m20250725_000003_create_test_runs;
mod m20250725_000004_create_test_cases;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250725_000001_create_users::Migration),
            Box::new(m20250725_000002_create_test_suites::Migration),
            Box::new(m20250725_000003_create_test_runs::Migration),
            Box::new(m20250725_000004_create_test_cases::Migration),
        ]
    }
}
