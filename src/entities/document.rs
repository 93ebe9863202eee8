//! Document entity - A file reference tied to a conversation and optionally
//! a shipment, with a category tag and a staff review status.
//!
//! The file bytes live in the blob store under `blob_id`; deleting a
//! document removes the blob first, then this record.

use super::enums::{DocumentCategory, DocumentStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Document database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    /// Unique identifier for the document
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Conversation this document was uploaded into
    pub conversation_id: i64,
    /// Shipment the document supports, if tied to one
    pub shipment_id: Option<i64>,
    /// Blob store key for the file bytes
    pub blob_id: String,
    /// Original file name
    pub file_name: String,
    /// MIME content type
    pub content_type: String,
    /// File size in bytes
    pub size_bytes: i64,
    /// Document category (health certificate, permit, photo, ...)
    pub category: DocumentCategory,
    /// Staff review status
    pub status: DocumentStatus,
    /// User id of the uploader
    pub uploaded_by: i64,
    /// User id of the reviewing staff member, once reviewed
    pub reviewed_by: Option<i64>,
    /// When the document was uploaded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Document and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each document belongs to one conversation
    #[sea_orm(
        belongs_to = "super::conversation::Entity",
        from = "Column::ConversationId",
        to = "super::conversation::Column::Id"
    )]
    Conversation,
    /// Each document may belong to one shipment
    #[sea_orm(
        belongs_to = "super::shipment::Entity",
        from = "Column::ShipmentId",
        to = "super::shipment::Column::Id"
    )]
    Shipment,
}

impl Related<super::conversation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Conversation.def()
    }
}

impl Related<super::shipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shipment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
