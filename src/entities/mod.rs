//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod conversation;
pub mod document;
pub mod enums;
pub mod message;
pub mod product;
pub mod quote_request;
pub mod quote_template;
pub mod shipment;
pub mod user;

// Re-export specific types to avoid conflicts
pub use conversation::{
    Column as ConversationColumn, Entity as Conversation, Model as ConversationModel,
};
pub use document::{Column as DocumentColumn, Entity as Document, Model as DocumentModel};
pub use message::{Column as MessageColumn, Entity as Message, Model as MessageModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use quote_request::{
    Column as QuoteRequestColumn, Entity as QuoteRequest, Model as QuoteRequestModel,
};
pub use quote_template::{
    Column as QuoteTemplateColumn, Entity as QuoteTemplate, Model as QuoteTemplateModel,
};
pub use shipment::{Column as ShipmentColumn, Entity as Shipment, Model as ShipmentModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
