//! Product entity - Catalog items (travel crates, comfort kits, ...) used to
//! populate product and upsell messages.
//!
//! Products are soft-deleted so historical product messages keep resolving.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Stock-keeping unit, unique across the catalog
    #[sea_orm(unique)]
    pub sku: String,
    /// Display name
    pub name: String,
    /// Unit price in cents
    pub price_cents: i64,
    /// Optional longer description
    pub description: Option<String>,
    /// Soft delete flag - if true, product is hidden but data is preserved
    pub is_deleted: bool,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

/// Products are referenced from message payloads by id only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
