pub use sea_orm_migration::prelude::*;

mod m20250401_000001_create_table;
mod m20250401_000002_create_table;
mod m20250401_000003_create_table;
mod m20250401_000004_create_table;
mod m20250415_000001_update_table;
mod m20250415_000002_create_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250401_000001_create_table::Migration),
            Box::new(m20250401_000002_create_table::Migration),
            Box::new(m20250401_000003_create_table::Migration),
            Box::new(m20250401_000004_create_table::Migration),
            Box::new(m20250415_000001_update_table::Migration),
            Box::new(m20250415_000002_create_index::Migration),
        ]
    }
}
