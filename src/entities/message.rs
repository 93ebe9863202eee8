//! Message entity - Append-only thread entries.
//!
//! The optional JSON `payload` shape depends on `kind`: quote messages carry
//! a title and price, product messages a product reference, status messages
//! an event-tagged object. Typed payload structs live in [`crate::core::message`].

use super::enums::MessageKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Message database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    /// Unique identifier for the message
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Conversation this message belongs to
    pub conversation_id: i64,
    /// User id of the sender
    pub sender_id: i64,
    /// Message kind: text, quote, product, or status
    pub kind: MessageKind,
    /// Free text body, if any
    pub body: Option<String>,
    /// Structured payload whose shape depends on `kind`
    pub payload: Option<Json>,
    /// When the message was created; ordering key within a conversation
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Message and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each message belongs to one conversation
    #[sea_orm(
        belongs_to = "super::conversation::Entity",
        from = "Column::ConversationId",
        to = "super::conversation::Column::Id"
    )]
    Conversation,
}

impl Related<super::conversation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Conversation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
