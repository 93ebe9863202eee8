//! Conversation entity - A message thread between staff and a client or
//! partner, or an internal thread.
//!
//! `participant_ids` is a JSON array of user ids; membership drives the
//! role-scoped visibility filter. `last_message_at` is bumped by every
//! message-producing mutation and orders the inbox.

use super::enums::ConversationKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Conversation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "conversations")]
pub struct Model {
    /// Unique identifier for the conversation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Thread title shown in the inbox
    pub title: String,
    /// Which side of the business this thread belongs to
    pub kind: ConversationKind,
    /// JSON array of participating user ids
    pub participant_ids: Json,
    /// Timestamp of the newest message; inbox sort key
    pub last_message_at: DateTimeUtc,
    /// When the conversation was created
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Decodes the participant id array. Malformed rows read as empty,
    /// which fails closed for non-staff visibility checks.
    #[must_use]
    pub fn participants(&self) -> Vec<i64> {
        serde_json::from_value(self.participant_ids.clone()).unwrap_or_default()
    }

    /// Whether the given user id is a participant.
    #[must_use]
    pub fn has_participant(&self, user_id: i64) -> bool {
        self.participants().contains(&user_id)
    }
}

/// Defines relationships between Conversation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One conversation has many messages
    #[sea_orm(has_many = "super::message::Entity")]
    Messages,
    /// One conversation has at most one shipment (unique index on the
    /// shipment side)
    #[sea_orm(has_many = "super::shipment::Entity")]
    Shipments,
    /// One conversation has many documents
    #[sea_orm(has_many = "super::document::Entity")]
    Documents,
}

impl Related<super::message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl Related<super::shipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shipments.def()
    }
}

impl Related<super::document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
