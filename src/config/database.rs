//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary tables
//! based on the entity definitions. The module uses `SeaORM`'s `Schema::create_table_from_entity`
//! method to automatically generate SQL statements from the entity models, ensuring that the
//! database schema matches the Rust struct definitions without requiring manual SQL.
//!
//! Writer contention is bounded by the driver's busy timeout; a write that
//! cannot acquire the database within it surfaces as [`crate::errors::Error::Busy`].

use crate::entities::{Donation, Donor, Farmer, Installment, Transaction};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/agrofund_ledger.sqlite?mode=rwc".to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL` environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// Table creation is idempotent (`IF NOT EXISTS`), so this is safe to run on
/// every startup against an existing database file.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut farmer_table = schema.create_table_from_entity(Farmer);
    let mut donor_table = schema.create_table_from_entity(Donor);
    let mut installment_table = schema.create_table_from_entity(Installment);
    let mut transaction_table = schema.create_table_from_entity(Transaction);
    let mut donation_table = schema.create_table_from_entity(Donation);

    db.execute(builder.build(farmer_table.if_not_exists())).await?;
    db.execute(builder.build(donor_table.if_not_exists())).await?;
    db.execute(builder.build(installment_table.if_not_exists())).await?;
    db.execute(builder.build(transaction_table.if_not_exists())).await?;
    db.execute(builder.build(donation_table.if_not_exists())).await?;

    Ok(())
}
