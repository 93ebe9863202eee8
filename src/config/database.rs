//! Database configuration module.
//!
//! Handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! struct definitions without hand-written SQL.

use crate::entities::{
    Conversation, Document, Message, Product, QuoteRequest, QuoteTemplate, Shipment, User,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns the default
/// `SQLite` path.
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/pawport.sqlite".to_string())
}

/// Establishes a connection to the database using `DATABASE_URL`, falling
/// back to a local `SQLite` file if the variable is not set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

/// Creates all tables from the entity definitions.
///
/// Statements are built with `IF NOT EXISTS`, so calling this on an existing
/// database is a no-op.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut stmts = vec![
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Conversation),
        schema.create_table_from_entity(Message),
        schema.create_table_from_entity(Shipment),
        schema.create_table_from_entity(Document),
        schema.create_table_from_entity(Product),
        schema.create_table_from_entity(QuoteTemplate),
        schema.create_table_from_entity(QuoteRequest),
    ];
    for stmt in &mut stmts {
        db.execute(builder.build(stmt.if_not_exists())).await?;
    }

    Ok(())
}
