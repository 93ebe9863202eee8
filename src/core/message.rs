//! Message business logic.
//!
//! Messages are the system's event log: sending one bumps conversation
//! activity and, for quote and status kinds, drives the shipment lifecycle.
//! Insert, activity bump, and implicit transition happen in one transaction
//! so a partially applied send can never be observed.

use crate::auth::Session;
use crate::core::{access, conversation as convo_core, shipment as shipment_core};
use crate::entities::{
    Conversation, Message, MessageColumn,
    enums::{MessageKind, ShipmentStatus},
    message,
};
use crate::errors::{Error, Result};
use sea_orm::{DatabaseConnection, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};

/// Payload of a `quote` message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotePayload {
    pub title: String,
    pub price_cents: i64,
}

/// Payload of a `product` message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPayload {
    pub product_id: i64,
}

/// Workflow events carried by `status` messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusEvent {
    QuoteRequested,
    QuoteAccepted,
    QuoteDeclined,
    PaymentReceived,
    PaymentRefunded,
    PaymentCompleted,
    BookingConfirmed,
}

/// Payload of a `status` message: a typed event plus free-form details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusPayload {
    #[serde(rename = "type")]
    pub event: StatusEvent,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl StatusPayload {
    #[must_use]
    pub fn new(event: StatusEvent) -> Self {
        Self {
            event,
            details: serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn with_detail(mut self, key: &str, value: serde_json::Value) -> Self {
        self.details.insert(key.to_string(), value);
        self
    }
}

/// Shipment state a status event implies, if any.
const fn implied_status(event: StatusEvent) -> Option<ShipmentStatus> {
    match event {
        StatusEvent::QuoteAccepted => Some(ShipmentStatus::BookingConfirmed),
        StatusEvent::PaymentCompleted => Some(ShipmentStatus::DocumentsPending),
        StatusEvent::QuoteDeclined => Some(ShipmentStatus::Cancelled),
        StatusEvent::QuoteRequested
        | StatusEvent::PaymentReceived
        | StatusEvent::PaymentRefunded
        | StatusEvent::BookingConfirmed => None,
    }
}

/// Checks that the payload matches the message kind and returns the parsed
/// status event for `status` messages.
fn validate_payload(
    kind: MessageKind,
    payload: Option<&serde_json::Value>,
) -> Result<Option<StatusEvent>> {
    match (kind, payload) {
        (MessageKind::Text, None) => Ok(None),
        (MessageKind::Text, Some(_)) => Err(Error::Config {
            message: "Text messages carry no payload".to_string(),
        }),
        (_, None) => Err(Error::Config {
            message: format!("{kind:?} messages require a payload"),
        }),
        (MessageKind::Quote, Some(value)) => {
            let quote: QuotePayload = serde_json::from_value(value.clone())?;
            if quote.price_cents < 0 {
                return Err(Error::InvalidAmount {
                    amount_cents: quote.price_cents,
                });
            }
            Ok(None)
        }
        (MessageKind::Product, Some(value)) => {
            serde_json::from_value::<ProductPayload>(value.clone())?;
            Ok(None)
        }
        (MessageKind::Status, Some(value)) => {
            let status: StatusPayload = serde_json::from_value(value.clone())?;
            Ok(Some(status.event))
        }
    }
}

/// Sends a message into a conversation the caller can see.
///
/// Quote messages move the shipment to `quote_sent`; status messages apply
/// their implied transition. Both are skipped silently when the conversation
/// has no shipment.
pub async fn send_message(
    db: &DatabaseConnection,
    session: &Session,
    conversation_id: i64,
    kind: MessageKind,
    body: Option<String>,
    payload: Option<serde_json::Value>,
) -> Result<message::Model> {
    let conversation = Conversation::find_by_id(conversation_id)
        .one(db)
        .await?
        .ok_or(Error::ConversationNotFound {
            id: conversation_id,
        })?;
    if !access::can_view_conversation(session, &conversation) {
        return Err(Error::Unauthorized {
            message: format!("Not a participant of conversation {conversation_id}"),
        });
    }

    if kind == MessageKind::Text && body.as_deref().is_none_or(|b| b.trim().is_empty()) {
        return Err(Error::Config {
            message: "Text messages require a non-empty body".to_string(),
        });
    }
    let event = validate_payload(kind, payload.as_ref())?;

    let sender_id = session.user_id;
    let txn = db.begin().await?;
    let inserted = insert_message(&txn, conversation_id, sender_id, kind, body, payload).await?;

    let transition = match kind {
        MessageKind::Quote => Some(ShipmentStatus::QuoteSent),
        MessageKind::Status => event.and_then(implied_status),
        MessageKind::Text | MessageKind::Product => None,
    };
    if let Some(target) = transition {
        shipment_core::advance_for_conversation(&txn, conversation_id, target).await?;
    }

    txn.commit().await?;
    Ok(inserted)
}

/// Inserts a message row and bumps conversation activity. Runs inside the
/// caller's transaction; does not apply implicit transitions.
pub(crate) async fn insert_message<C>(
    db: &C,
    conversation_id: i64,
    sender_id: i64,
    kind: MessageKind,
    body: Option<String>,
    payload: Option<serde_json::Value>,
) -> Result<message::Model>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now();
    let inserted = message::ActiveModel {
        conversation_id: Set(conversation_id),
        sender_id: Set(sender_id),
        kind: Set(kind),
        body: Set(body),
        payload: Set(payload),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    convo_core::touch_activity(db, conversation_id, now).await?;
    Ok(inserted)
}

/// Posts a status message on behalf of a user. For internal workflow
/// announcements (payment recorded, booking confirmed); skips the implicit
/// transition machinery.
pub(crate) async fn post_status<C>(
    db: &C,
    conversation_id: i64,
    sender_id: i64,
    payload: &StatusPayload,
) -> Result<message::Model>
where
    C: ConnectionTrait,
{
    insert_message(
        db,
        conversation_id,
        sender_id,
        MessageKind::Status,
        None,
        Some(serde_json::to_value(payload)?),
    )
    .await
}

/// Lists a conversation's messages, oldest first.
pub async fn list_messages(
    db: &DatabaseConnection,
    session: &Session,
    conversation_id: i64,
) -> Result<Vec<message::Model>> {
    // Re-uses the visibility check in get_conversation.
    convo_core::get_conversation(db, session, conversation_id).await?;

    Message::find()
        .filter(MessageColumn::ConversationId.eq(conversation_id))
        .order_by_asc(MessageColumn::CreatedAt)
        .order_by_asc(MessageColumn::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
