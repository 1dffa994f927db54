//! Database migrations.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20260101_000001_create_account_table;
mod m20260101_000002_create_tutor_request_tables;
mod m20260101_000003_create_combo_tables;
mod m20260101_000004_create_notification_table;
mod m20260101_000005_create_booking_tables;
mod m20260101_000006_create_post_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_account_table::Migration),
            Box::new(m20260101_000002_create_tutor_request_tables::Migration),
            Box::new(m20260101_000003_create_combo_tables::Migration),
            Box::new(m20260101_000004_create_notification_table::Migration),
            Box::new(m20260101_000005_create_booking_tables::Migration),
            Box::new(m20260101_000006_create_post_tables::Migration),
        ]
    }
}
