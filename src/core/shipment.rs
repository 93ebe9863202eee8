//! Shipment business logic and the lifecycle state machine.
//!
//! Explicit status updates are validated against the machine: a transition
//! is legal when the target is a recommended next state of the current one,
//! or when it cancels a non-terminal shipment. Message-driven implicit
//! transitions (quote sent, quote accepted, payment completed, quote
//! declined) bypass the check because they encode the workflow itself, and
//! are silently skipped when the conversation has no shipment.

use crate::auth::Session;
use crate::core::access;
use crate::entities::{
    Conversation, Shipment, ShipmentColumn, enums::ShipmentStatus, shipment,
};
use crate::errors::{Error, Result};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, info};

/// Arguments for creating a shipment.
#[derive(Debug, Clone)]
pub struct NewShipment {
    pub conversation_id: i64,
    pub pet_name: String,
    pub pet_type: String,
    pub breed: Option<String>,
    pub weight_kg: Option<f64>,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: Option<String>,
    pub origin: String,
    pub destination: String,
}

/// Recommended next states for each lifecycle state.
///
/// `cancelled` is additionally reachable from every non-terminal state and
/// is not repeated here.
#[must_use]
pub const fn recommended_next(status: ShipmentStatus) -> &'static [ShipmentStatus] {
    use ShipmentStatus as S;
    match status {
        S::QuoteRequested => &[S::QuoteSent],
        S::QuoteSent => &[S::BookingConfirmed],
        S::BookingConfirmed => &[S::DocumentsPending],
        S::DocumentsPending => &[S::DocumentsApproved],
        S::DocumentsApproved => &[S::FlightScheduled],
        S::FlightScheduled => &[S::ReadyForPickup],
        S::ReadyForPickup => &[S::InTransit],
        S::InTransit => &[S::Arrived],
        S::Arrived => &[S::Delivered],
        S::Delivered => &[S::Completed],
        S::Completed | S::Cancelled => &[],
    }
}

/// Whether an explicit transition from `from` to `to` is legal.
#[must_use]
pub fn can_transition(from: ShipmentStatus, to: ShipmentStatus) -> bool {
    if from.is_terminal() {
        return false;
    }
    to == ShipmentStatus::Cancelled || recommended_next(from).contains(&to)
}

/// Creates a shipment for a conversation, rejecting a second shipment on the
/// same thread before the unique index would.
pub async fn create_shipment<C>(db: &C, args: NewShipment) -> Result<shipment::Model>
where
    C: ConnectionTrait,
{
    Conversation::find_by_id(args.conversation_id)
        .one(db)
        .await?
        .ok_or(Error::ConversationNotFound {
            id: args.conversation_id,
        })?;

    let existing = Shipment::find()
        .filter(ShipmentColumn::ConversationId.eq(args.conversation_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::ShipmentExists {
            conversation_id: args.conversation_id,
        });
    }

    let now = chrono::Utc::now();
    let shipment = shipment::ActiveModel {
        conversation_id: Set(args.conversation_id),
        pet_name: Set(args.pet_name),
        pet_type: Set(args.pet_type),
        breed: Set(args.breed),
        weight_kg: Set(args.weight_kg),
        owner_name: Set(args.owner_name),
        owner_email: Set(args.owner_email),
        owner_phone: Set(args.owner_phone),
        origin: Set(args.origin),
        destination: Set(args.destination),
        status: Set(ShipmentStatus::QuoteRequested),
        flight_number: Set(None),
        departure_at: Set(None),
        arrival_at: Set(None),
        total_amount_cents: Set(None),
        paid_amount_cents: Set(0),
        payment_status: Set(crate::entities::enums::PaymentStatus::Pending),
        line_items: Set(serde_json::json!([])),
        payment_history: Set(serde_json::json!([])),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = shipment.insert(db).await?;
    info!(
        "Created shipment {} for conversation {} ({} {} -> {})",
        result.id, result.conversation_id, result.pet_name, result.origin, result.destination
    );
    Ok(result)
}

/// Fetches one shipment, enforcing visibility through its conversation.
pub async fn get_shipment(
    db: &DatabaseConnection,
    session: &Session,
    shipment_id: i64,
) -> Result<shipment::Model> {
    let shipment = Shipment::find_by_id(shipment_id)
        .one(db)
        .await?
        .ok_or(Error::ShipmentNotFound { id: shipment_id })?;

    if !session.role.is_staff() {
        let conversation = Conversation::find_by_id(shipment.conversation_id)
            .one(db)
            .await?
            .ok_or(Error::ConversationNotFound {
                id: shipment.conversation_id,
            })?;
        if !access::can_view_conversation(session, &conversation) {
            return Err(Error::Unauthorized {
                message: format!("Not a participant of shipment {shipment_id}"),
            });
        }
    }

    Ok(shipment)
}

/// Finds the shipment attached to a conversation, if any.
pub async fn get_shipment_for_conversation<C>(
    db: &C,
    conversation_id: i64,
) -> Result<Option<shipment::Model>>
where
    C: ConnectionTrait,
{
    Shipment::find()
        .filter(ShipmentColumn::ConversationId.eq(conversation_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists shipments visible to the caller, newest first.
pub async fn list_shipments(
    db: &DatabaseConnection,
    session: &Session,
) -> Result<Vec<shipment::Model>> {
    let all = Shipment::find()
        .order_by_desc(ShipmentColumn::CreatedAt)
        .all(db)
        .await?;

    if session.role.is_staff() {
        return Ok(all);
    }

    let visible: std::collections::HashSet<i64> =
        crate::core::conversation::list_conversations(db, session)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();

    Ok(all
        .into_iter()
        .filter(|s| visible.contains(&s.conversation_id))
        .collect())
}

/// Explicit staff status update, validated against the state machine.
pub async fn update_status(
    db: &DatabaseConnection,
    session: &Session,
    shipment_id: i64,
    new_status: ShipmentStatus,
) -> Result<shipment::Model> {
    access::require_staff(session, "Updating shipment status")?;

    let shipment = Shipment::find_by_id(shipment_id)
        .one(db)
        .await?
        .ok_or(Error::ShipmentNotFound { id: shipment_id })?;

    if !can_transition(shipment.status, new_status) {
        return Err(Error::InvalidTransition {
            from: shipment.status,
            to: new_status,
        });
    }

    let from = shipment.status;
    let mut active: shipment::ActiveModel = shipment.into();
    active.status = Set(new_status);
    active.updated_at = Set(chrono::Utc::now());
    let result = active.update(db).await?;

    info!(
        "Shipment {} status {:?} -> {:?} by user {}",
        shipment_id, from, new_status, session.user_id
    );
    Ok(result)
}

/// Updates flight/logistics fields. Staff only; no status change.
pub async fn update_flight(
    db: &DatabaseConnection,
    session: &Session,
    shipment_id: i64,
    flight_number: Option<String>,
    departure_at: Option<chrono::DateTime<chrono::Utc>>,
    arrival_at: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<shipment::Model> {
    access::require_staff(session, "Updating flight details")?;

    let shipment = Shipment::find_by_id(shipment_id)
        .one(db)
        .await?
        .ok_or(Error::ShipmentNotFound { id: shipment_id })?;

    let mut active: shipment::ActiveModel = shipment.into();
    active.flight_number = Set(flight_number);
    active.departure_at = Set(departure_at);
    active.arrival_at = Set(arrival_at);
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Implicit message-driven transition: moves the conversation's shipment to
/// `target`, or silently skips when the conversation has no shipment. The
/// message that triggered the transition persists either way.
pub async fn advance_for_conversation<C>(
    db: &C,
    conversation_id: i64,
    target: ShipmentStatus,
) -> Result<Option<shipment::Model>>
where
    C: ConnectionTrait,
{
    let Some(shipment) = get_shipment_for_conversation(db, conversation_id).await? else {
        debug!(
            "No shipment for conversation {conversation_id}; skipping implicit transition to {target:?}"
        );
        return Ok(None);
    };

    if shipment.status == target {
        return Ok(Some(shipment));
    }

    let from = shipment.status;
    let mut active: shipment::ActiveModel = shipment.into();
    active.status = Set(target);
    active.updated_at = Set(chrono::Utc::now());
    let result = active.update(db).await?;

    debug!(
        "Shipment {} implicit status {:?} -> {:?}",
        result.id, from, target
    );
    Ok(Some(result))
}
