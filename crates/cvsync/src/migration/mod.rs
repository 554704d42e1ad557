//! Database migrations for the warehouse schema.
//!
//! Running [`Migrator::up`] is idempotent; the sync engine does it at the
//! start of every pass.

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_schema;
mod m20260301_000002_create_reporting_views;

/// The migrator that runs all migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_schema::Migration),
            Box::new(m20260301_000002_create_reporting_views::Migration),
        ]
    }

    fn migration_table_name() -> SeaRc<dyn Iden> {
        SeaRc::new(Alias::new("cvsync_migrations"))
    }
}
