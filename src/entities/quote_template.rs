//! Quote template entity - Reusable quote text with a default price, used by
//! staff to populate quote messages quickly.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Quote template database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quote_templates")]
pub struct Model {
    /// Unique identifier for the template
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short title shown in the template picker
    pub title: String,
    /// Quote body text
    pub body: String,
    /// Default quoted price in cents
    pub default_price_cents: i64,
    /// When the template was created
    pub created_at: DateTimeUtc,
    /// When the template was last modified
    pub updated_at: DateTimeUtc,
}

/// Templates stand alone; quote messages copy their content
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
