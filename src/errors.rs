//! Unified error types and result handling.
//!
//! Every fallible operation in the crate returns [`Result`]. Variants carry
//! enough structure for the HTTP layer to map them onto status codes without
//! string matching.

use crate::entities::enums::ShipmentStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Shipment not found: {id}")]
    ShipmentNotFound { id: i64 },

    #[error("Conversation not found: {id}")]
    ConversationNotFound { id: i64 },

    #[error("Document not found: {id}")]
    DocumentNotFound { id: i64 },

    #[error("Product not found: {id}")]
    ProductNotFound { id: i64 },

    #[error("Quote template not found: {id}")]
    TemplateNotFound { id: i64 },

    #[error("User not found: {ident}")]
    UserNotFound { ident: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Invalid amount: {amount_cents} cents")]
    InvalidAmount { amount_cents: i64 },

    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: ShipmentStatus,
        to: ShipmentStatus,
    },

    #[error("Conversation {conversation_id} already has a shipment")]
    ShipmentExists { conversation_id: i64 },

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
