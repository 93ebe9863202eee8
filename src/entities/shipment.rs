//! Shipment entity - One pet booking per conversation.
//!
//! Carries the pet, owner, and route details, the lifecycle status, flight
//! fields, and the embedded payment ledger: total due, amount paid, payment
//! status, itemized line items, and an append-only payment history log.
//! Money is integer cents throughout; `paid_amount_cents` may go negative
//! on over-refund and is never clamped.

use super::enums::{PaymentStatus, ShipmentStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Shipment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shipments")]
pub struct Model {
    /// Unique identifier for the shipment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning conversation; unique, so each conversation has at most one
    /// shipment
    #[sea_orm(unique)]
    pub conversation_id: i64,
    /// Pet name
    pub pet_name: String,
    /// Pet type (e.g., "dog", "cat")
    pub pet_type: String,
    /// Breed, if known
    pub breed: Option<String>,
    /// Weight in kilograms, if known
    pub weight_kg: Option<f64>,
    /// Owner contact name
    pub owner_name: String,
    /// Owner contact email
    pub owner_email: String,
    /// Owner contact phone, if given
    pub owner_phone: Option<String>,
    /// Origin airport/city code
    pub origin: String,
    /// Destination airport/city code
    pub destination: String,
    /// Lifecycle status
    pub status: ShipmentStatus,
    /// Assigned flight number, once scheduled
    pub flight_number: Option<String>,
    /// Scheduled departure time
    pub departure_at: Option<DateTimeUtc>,
    /// Scheduled arrival time
    pub arrival_at: Option<DateTimeUtc>,
    /// Total amount due in cents; None means no billing set yet
    pub total_amount_cents: Option<i64>,
    /// Amount paid so far in cents; negative signals over-refund
    pub paid_amount_cents: i64,
    /// Payment status derived from total and paid amounts
    pub payment_status: PaymentStatus,
    /// JSON array of itemized charges (see `core::payment::LineItem`)
    pub line_items: Json,
    /// JSON array of payment/refund log entries, append-only
    pub payment_history: Json,
    /// When the shipment was created
    pub created_at: DateTimeUtc,
    /// When the shipment was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Shipment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each shipment belongs to one conversation
    #[sea_orm(
        belongs_to = "super::conversation::Entity",
        from = "Column::ConversationId",
        to = "super::conversation::Column::Id"
    )]
    Conversation,
    /// One shipment has many documents
    #[sea_orm(has_many = "super::document::Entity")]
    Documents,
}

impl Related<super::conversation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Conversation.def()
    }
}

impl Related<super::document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
