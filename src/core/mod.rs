//! Business logic, grouped by aggregate.

pub mod access;
pub mod conversation;
pub mod document;
pub mod maintenance;
pub mod message;
pub mod payment;
pub mod product;
pub mod quote;
pub mod shipment;
pub mod user;
