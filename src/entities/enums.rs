//! String-backed active enums shared across entities.
//!
//! Each enum is stored as its `snake_case` string value so the database rows
//! stay readable in a plain SQLite shell, and serializes the same way over
//! the API.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Caller role, carried in the signed session token.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "staff")]
    Staff,
    #[sea_orm(string_value = "client")]
    Client,
    #[sea_orm(string_value = "partner")]
    Partner,
}

impl Role {
    /// Admin and staff see every row; clients and partners are scoped to
    /// conversations they participate in.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Staff)
    }
}

/// Which side of the business a conversation belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ConversationKind {
    #[sea_orm(string_value = "client")]
    Client,
    #[sea_orm(string_value = "partner")]
    Partner,
    #[sea_orm(string_value = "internal")]
    Internal,
}

/// Message kind; determines the shape of the optional JSON payload.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[sea_orm(string_value = "text")]
    Text,
    #[sea_orm(string_value = "quote")]
    Quote,
    #[sea_orm(string_value = "product")]
    Product,
    #[sea_orm(string_value = "status")]
    Status,
}

/// Shipment lifecycle status. Linear with branches; `cancelled` is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    #[sea_orm(string_value = "quote_requested")]
    QuoteRequested,
    #[sea_orm(string_value = "quote_sent")]
    QuoteSent,
    #[sea_orm(string_value = "booking_confirmed")]
    BookingConfirmed,
    #[sea_orm(string_value = "documents_pending")]
    DocumentsPending,
    #[sea_orm(string_value = "documents_approved")]
    DocumentsApproved,
    #[sea_orm(string_value = "flight_scheduled")]
    FlightScheduled,
    #[sea_orm(string_value = "ready_for_pickup")]
    ReadyForPickup,
    #[sea_orm(string_value = "in_transit")]
    InTransit,
    #[sea_orm(string_value = "arrived")]
    Arrived,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl ShipmentStatus {
    /// Terminal states accept no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Payment status; a pure function of total due and amount paid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "partial")]
    Partial,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

/// Category tag for uploaded documents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    #[sea_orm(string_value = "health_certificate")]
    HealthCertificate,
    #[sea_orm(string_value = "vaccination_record")]
    VaccinationRecord,
    #[sea_orm(string_value = "import_permit")]
    ImportPermit,
    #[sea_orm(string_value = "export_permit")]
    ExportPermit,
    #[sea_orm(string_value = "photo")]
    Photo,
    #[sea_orm(string_value = "other")]
    Other,
}

/// Staff review state for an uploaded document.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}
