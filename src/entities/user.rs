//! User entity - Everyone who can log in: admins, staff, clients, partners.
//!
//! There is no password column: authentication is lookup-by-email plus a
//! signed session token. Role and organization are fixed at creation.

use super::enums::Role;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Login email, unique across the system
    #[sea_orm(unique)]
    pub email: String,
    /// Access role: admin, staff, client, or partner
    pub role: Role,
    /// Partner organization the user belongs to, if any
    pub organization: Option<String>,
    /// When the user was created
    pub created_at: DateTimeUtc,
}

/// Users are referenced by id from conversations, messages, and documents;
/// no foreign keys point back out of this table.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
