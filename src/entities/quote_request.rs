//! Quote request entity - The customer intake form as submitted.
//!
//! Submitting a quote request fans out into a conversation, a shipment, and
//! an initial status message in one database transaction; this row keeps the
//! original form data.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Quote request database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quote_requests")]
pub struct Model {
    /// Unique identifier for the quote request
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User id of the submitting customer
    pub submitter_id: i64,
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
    /// Free-form notes from the customer
    pub notes: Option<String>,
    /// When the request was submitted
    pub created_at: DateTimeUtc,
}

/// The fan-out records reference this row from the initial status message
/// payload; no foreign keys point out of this table
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
