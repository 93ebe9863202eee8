//! Billing and the payment ledger.
//!
//! Each shipment carries its own ledger: line items, a running paid total,
//! and an append-only payment history. Paid totals are updated with an
//! atomic SQL increment rather than read-modify-write, so concurrent
//! payments against the same shipment cannot lose each other. Negative
//! running totals are preserved as-is; an over-refund shows up as a
//! `refunded` shipment with negative paid cents, not a clamped zero.

use crate::auth::Session;
use crate::core::{
    access,
    message::{StatusEvent, StatusPayload, post_status},
    shipment as shipment_core,
};
use crate::entities::{
    Shipment, ShipmentColumn,
    enums::{PaymentStatus, ShipmentStatus},
    shipment,
};
use crate::errors::{Error, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One billed item on a shipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub amount_cents: i64,
}

/// One entry in a shipment's payment history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentHistoryEntry {
    pub amount_cents: i64,
    /// "payment" or "refund".
    pub entry_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub actor_id: i64,
    pub at: chrono::DateTime<chrono::Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A recorded payment or refund.
#[derive(Debug, Clone, Default)]
pub struct PaymentArgs {
    pub amount_cents: i64,
    pub method: Option<String>,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

/// Per-shipment billing figures for the staff dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentSummary {
    pub shipment_id: i64,
    pub conversation_id: i64,
    pub pet_name: String,
    pub total_amount_cents: Option<i64>,
    pub paid_amount_cents: i64,
    pub outstanding_cents: i64,
    pub payment_status: PaymentStatus,
}

/// Derives a payment status from the billed total and the running paid sum.
///
/// A negative running sum always reads as refunded. With no (or zero) billed
/// total, any positive payment counts as paid in full.
#[must_use]
pub fn payment_status_for(total_amount_cents: Option<i64>, paid_cents: i64) -> PaymentStatus {
    if paid_cents < 0 {
        return PaymentStatus::Refunded;
    }
    match total_amount_cents {
        Some(total) if total > 0 => {
            if paid_cents >= total {
                PaymentStatus::Paid
            } else if paid_cents > 0 {
                PaymentStatus::Partial
            } else {
                PaymentStatus::Pending
            }
        }
        _ => {
            if paid_cents > 0 {
                PaymentStatus::Paid
            } else {
                PaymentStatus::Pending
            }
        }
    }
}

fn history_of(shipment: &shipment::Model) -> Result<Vec<PaymentHistoryEntry>> {
    serde_json::from_value(shipment.payment_history.clone()).map_err(Into::into)
}

/// Sets a shipment's billing: either line items (total is their sum) or an
/// explicit total. Staff only; recomputes the payment status.
pub async fn set_billing(
    db: &DatabaseConnection,
    session: &Session,
    shipment_id: i64,
    line_items: Option<Vec<LineItem>>,
    total_amount_cents: Option<i64>,
) -> Result<shipment::Model> {
    access::require_staff(session, "Setting billing")?;

    let shipment = Shipment::find_by_id(shipment_id)
        .one(db)
        .await?
        .ok_or(Error::ShipmentNotFound { id: shipment_id })?;

    let (items, total) = match (line_items, total_amount_cents) {
        (Some(items), _) => {
            for item in &items {
                if item.amount_cents < 0 {
                    return Err(Error::InvalidAmount {
                        amount_cents: item.amount_cents,
                    });
                }
            }
            let sum = items.iter().map(|i| i.amount_cents).sum();
            (items, sum)
        }
        (None, Some(total)) => {
            if total < 0 {
                return Err(Error::InvalidAmount {
                    amount_cents: total,
                });
            }
            (Vec::new(), total)
        }
        (None, None) => {
            return Err(Error::Config {
                message: "Billing requires line items or an explicit total".to_string(),
            });
        }
    };

    let paid = shipment.paid_amount_cents;
    let mut active: shipment::ActiveModel = shipment.into();
    active.line_items = Set(serde_json::to_value(&items)?);
    active.total_amount_cents = Set(Some(total));
    active.payment_status = Set(payment_status_for(Some(total), paid));
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Records a payment against a shipment's ledger.
///
/// Runs in one transaction: atomic increment of the paid total, history
/// append, status recompute, and a `payment_received` status message on the
/// conversation. When the shipment becomes paid in full it also posts a
/// `payment_completed` message and, if still at `quote_sent`, confirms the
/// booking.
pub async fn process_payment(
    db: &DatabaseConnection,
    session: &Session,
    shipment_id: i64,
    args: PaymentArgs,
) -> Result<shipment::Model> {
    if args.amount_cents <= 0 {
        return Err(Error::InvalidAmount {
            amount_cents: args.amount_cents,
        });
    }
    apply_ledger_entry(db, session, shipment_id, args, false).await
}

/// Records a refund against a shipment's ledger. `amount_cents` is the
/// positive refund amount; the ledger delta is negative.
pub async fn process_refund(
    db: &DatabaseConnection,
    session: &Session,
    shipment_id: i64,
    args: PaymentArgs,
) -> Result<shipment::Model> {
    access::require_staff(session, "Processing refunds")?;
    if args.amount_cents <= 0 {
        return Err(Error::InvalidAmount {
            amount_cents: args.amount_cents,
        });
    }
    apply_ledger_entry(db, session, shipment_id, args, true).await
}

async fn apply_ledger_entry(
    db: &DatabaseConnection,
    session: &Session,
    shipment_id: i64,
    args: PaymentArgs,
    is_refund: bool,
) -> Result<shipment::Model> {
    // Existence and visibility before any write
    let before = shipment_core::get_shipment(db, session, shipment_id).await?;
    let was_paid = before.payment_status == PaymentStatus::Paid;
    let delta = if is_refund {
        -args.amount_cents
    } else {
        args.amount_cents
    };

    let txn = db.begin().await?;

    Shipment::update_many()
        .col_expr(
            ShipmentColumn::PaidAmountCents,
            Expr::col(ShipmentColumn::PaidAmountCents).add(delta),
        )
        .filter(ShipmentColumn::Id.eq(shipment_id))
        .exec(&txn)
        .await?;

    let shipment = Shipment::find_by_id(shipment_id)
        .one(&txn)
        .await?
        .ok_or(Error::ShipmentNotFound { id: shipment_id })?;

    let now = chrono::Utc::now();
    let new_status = payment_status_for(shipment.total_amount_cents, shipment.paid_amount_cents);
    let mut history = history_of(&shipment)?;
    history.push(PaymentHistoryEntry {
        amount_cents: delta,
        entry_type: if is_refund { "refund" } else { "payment" }.to_string(),
        method: args.method.clone(),
        reference: args.reference.clone(),
        actor_id: session.user_id,
        at: now,
        notes: args.notes,
    });

    let conversation_id = shipment.conversation_id;
    let lifecycle = shipment.status;
    let newly_paid = !was_paid && new_status == PaymentStatus::Paid;

    let mut active: shipment::ActiveModel = shipment.into();
    active.payment_status = Set(new_status);
    active.payment_history = Set(serde_json::to_value(&history)?);
    active.updated_at = Set(now);
    let mut updated = active.update(&txn).await?;

    let event = if is_refund {
        StatusEvent::PaymentRefunded
    } else {
        StatusEvent::PaymentReceived
    };
    let payload = StatusPayload::new(event)
        .with_detail("shipment_id", serde_json::json!(shipment_id))
        .with_detail("amount_cents", serde_json::json!(args.amount_cents))
        .with_detail("method", serde_json::json!(args.method));
    post_status(&txn, conversation_id, session.user_id, &payload).await?;

    if newly_paid {
        let payload = StatusPayload::new(StatusEvent::PaymentCompleted)
            .with_detail("shipment_id", serde_json::json!(shipment_id));
        post_status(&txn, conversation_id, session.user_id, &payload).await?;
        if lifecycle == ShipmentStatus::QuoteSent {
            if let Some(advanced) = shipment_core::advance_for_conversation(
                &txn,
                conversation_id,
                ShipmentStatus::BookingConfirmed,
            )
            .await?
            {
                updated = advanced;
            }
            let payload = StatusPayload::new(StatusEvent::BookingConfirmed)
                .with_detail("shipment_id", serde_json::json!(shipment_id));
            post_status(&txn, conversation_id, session.user_id, &payload).await?;
        }
    }

    txn.commit().await?;
    info!(
        "Recorded {} of {} cents on shipment {} (now {:?}, paid {})",
        if is_refund { "refund" } else { "payment" },
        args.amount_cents,
        shipment_id,
        updated.payment_status,
        updated.paid_amount_cents
    );
    Ok(updated)
}

/// Billing figures for every shipment the caller can see, newest first.
pub async fn payment_summary(
    db: &DatabaseConnection,
    session: &Session,
) -> Result<Vec<PaymentSummary>> {
    let shipments = shipment_core::list_shipments(db, session).await?;
    Ok(shipments
        .into_iter()
        .map(|s| PaymentSummary {
            shipment_id: s.id,
            conversation_id: s.conversation_id,
            pet_name: s.pet_name,
            total_amount_cents: s.total_amount_cents,
            paid_amount_cents: s.paid_amount_cents,
            outstanding_cents: s.total_amount_cents.unwrap_or(0) - s.paid_amount_cents,
            payment_status: s.payment_status,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::message;
    use crate::entities::enums::{MessageKind, Role};
    use crate::test_utils::*;

    #[test]
    fn test_payment_status_for() {
        use PaymentStatus as P;
        assert_eq!(payment_status_for(Some(1000), 0), P::Pending);
        assert_eq!(payment_status_for(Some(1000), 400), P::Partial);
        assert_eq!(payment_status_for(Some(1000), 1000), P::Paid);
        assert_eq!(payment_status_for(Some(1000), 1500), P::Paid);
        assert_eq!(payment_status_for(Some(1000), -100), P::Refunded);
        // No billed total: any positive payment is paid in full
        assert_eq!(payment_status_for(None, 0), P::Pending);
        assert_eq!(payment_status_for(None, 500), P::Paid);
        assert_eq!(payment_status_for(Some(0), 500), P::Paid);
        assert_eq!(payment_status_for(None, -1), P::Refunded);
    }

    #[tokio::test]
    async fn test_set_billing_from_line_items() -> Result<()> {
        let (db, _convo, shipment) = setup_with_shipment().await?;
        let staff = create_test_user(&db, "Dana", "dana@example.com", Role::Staff).await?;

        let items = vec![
            LineItem {
                description: "Air freight".to_string(),
                category: Some("transport".to_string()),
                amount_cents: 200_000,
            },
            LineItem {
                description: "Crate".to_string(),
                category: None,
                amount_cents: 15_000,
            },
        ];
        let updated =
            set_billing(&db, &session_for(&staff), shipment.id, Some(items), None).await?;
        assert_eq!(updated.total_amount_cents, Some(215_000));
        assert_eq!(updated.payment_status, PaymentStatus::Pending);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_billing_rejects_bad_input() -> Result<()> {
        let (db, _convo, shipment) = setup_with_shipment().await?;
        let staff = create_test_user(&db, "Dana", "dana@example.com", Role::Staff).await?;
        let session = session_for(&staff);

        let result = set_billing(&db, &session, shipment.id, None, None).await;
        assert!(matches!(result, Err(Error::Config { .. })));

        let result = set_billing(&db, &session, shipment.id, None, Some(-100)).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        let client = create_test_user(&db, "Ana", "ana@example.com", Role::Client).await?;
        let result =
            set_billing(&db, &session_for(&client), shipment.id, None, Some(100)).await;
        assert!(matches!(result, Err(Error::Unauthorized { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_partial_then_full_payment() -> Result<()> {
        let (db, convo, shipment) = setup_with_shipment().await?;
        let staff = create_test_user(&db, "Dana", "dana@example.com", Role::Staff).await?;
        let session = session_for(&staff);
        set_billing(&db, &session, shipment.id, None, Some(100_000)).await?;

        let updated = process_payment(
            &db,
            &session,
            shipment.id,
            PaymentArgs {
                amount_cents: 40_000,
                method: Some("card".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.paid_amount_cents, 40_000);
        assert_eq!(updated.payment_status, PaymentStatus::Partial);

        let updated = process_payment(
            &db,
            &session,
            shipment.id,
            PaymentArgs {
                amount_cents: 60_000,
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.paid_amount_cents, 100_000);
        assert_eq!(updated.payment_status, PaymentStatus::Paid);

        // Ledger equals the sum of its entries
        let history = history_of(&updated)?;
        let sum: i64 = history.iter().map(|e| e.amount_cents).sum();
        assert_eq!(sum, updated.paid_amount_cents);

        // Payment messages landed on the conversation
        let messages = message::list_messages(&db, &session, convo.id).await?;
        let statuses: Vec<_> = messages
            .iter()
            .filter(|m| m.kind == MessageKind::Status)
            .collect();
        assert_eq!(statuses.len(), 3); // two payment_received + one payment_completed
        Ok(())
    }

    #[tokio::test]
    async fn test_full_payment_confirms_booking() -> Result<()> {
        let (db, convo, shipment) = setup_with_shipment().await?;
        let staff = create_test_user(&db, "Dana", "dana@example.com", Role::Staff).await?;
        let session = session_for(&staff);
        set_billing(&db, &session, shipment.id, None, Some(50_000)).await?;
        shipment_core::update_status(&db, &session, shipment.id, ShipmentStatus::QuoteSent)
            .await?;

        let updated = process_payment(
            &db,
            &session,
            shipment.id,
            PaymentArgs {
                amount_cents: 50_000,
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.payment_status, PaymentStatus::Paid);
        assert_eq!(updated.status, ShipmentStatus::BookingConfirmed);

        // The conversation announces both the money and the confirmation
        let events: Vec<StatusEvent> = message::list_messages(&db, &session, convo.id)
            .await?
            .iter()
            .filter(|m| m.kind == MessageKind::Status)
            .filter_map(|m| {
                let payload: message::StatusPayload =
                    serde_json::from_value(m.payload.clone()?).ok()?;
                Some(payload.event)
            })
            .collect();
        assert_eq!(
            events,
            vec![
                StatusEvent::PaymentReceived,
                StatusEvent::PaymentCompleted,
                StatusEvent::BookingConfirmed,
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_partial_refund() -> Result<()> {
        let (db, _convo, shipment) = setup_with_shipment().await?;
        let staff = create_test_user(&db, "Dana", "dana@example.com", Role::Staff).await?;
        let session = session_for(&staff);
        set_billing(&db, &session, shipment.id, None, Some(100_000)).await?;
        process_payment(
            &db,
            &session,
            shipment.id,
            PaymentArgs {
                amount_cents: 100_000,
                ..Default::default()
            },
        )
        .await?;

        let updated = process_refund(
            &db,
            &session,
            shipment.id,
            PaymentArgs {
                amount_cents: 30_000,
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.paid_amount_cents, 70_000);
        assert_eq!(updated.payment_status, PaymentStatus::Partial);

        // Refund landed as its own history entry
        let history = history_of(&updated)?;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].entry_type, "refund");
        assert_eq!(history[1].amount_cents, -30_000);
        Ok(())
    }

    #[tokio::test]
    async fn test_over_refund_goes_negative() -> Result<()> {
        let (db, _convo, shipment) = setup_with_shipment().await?;
        let staff = create_test_user(&db, "Dana", "dana@example.com", Role::Staff).await?;
        let session = session_for(&staff);
        set_billing(&db, &session, shipment.id, None, Some(30_000)).await?;

        process_payment(
            &db,
            &session,
            shipment.id,
            PaymentArgs {
                amount_cents: 30_000,
                ..Default::default()
            },
        )
        .await?;

        let updated = process_refund(
            &db,
            &session,
            shipment.id,
            PaymentArgs {
                amount_cents: 45_000,
                reference: Some("chargeback".to_string()),
                ..Default::default()
            },
        )
        .await?;
        // Preserved, not clamped
        assert_eq!(updated.paid_amount_cents, -15_000);
        assert_eq!(updated.payment_status, PaymentStatus::Refunded);
        Ok(())
    }

    #[tokio::test]
    async fn test_payment_against_negative_ledger_stays_refunded() -> Result<()> {
        let (db, _convo, shipment) = setup_with_shipment().await?;
        let staff = create_test_user(&db, "Dana", "dana@example.com", Role::Staff).await?;
        let session = session_for(&staff);
        set_billing(&db, &session, shipment.id, None, Some(30_000)).await?;
        process_payment(
            &db,
            &session,
            shipment.id,
            PaymentArgs {
                amount_cents: 30_000,
                ..Default::default()
            },
        )
        .await?;
        process_refund(
            &db,
            &session,
            shipment.id,
            PaymentArgs {
                amount_cents: 45_000,
                ..Default::default()
            },
        )
        .await?;

        // A payment that leaves the running total negative still reads as
        // refunded
        let updated = process_payment(
            &db,
            &session,
            shipment.id,
            PaymentArgs {
                amount_cents: 5_000,
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.paid_amount_cents, -10_000);
        assert_eq!(updated.payment_status, PaymentStatus::Refunded);

        // Crossing back above zero resumes the normal derivation
        let updated = process_payment(
            &db,
            &session,
            shipment.id,
            PaymentArgs {
                amount_cents: 20_000,
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.paid_amount_cents, 10_000);
        assert_eq!(updated.payment_status, PaymentStatus::Partial);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_amounts_rejected() -> Result<()> {
        let (db, _convo, shipment) = setup_with_shipment().await?;
        let staff = create_test_user(&db, "Dana", "dana@example.com", Role::Staff).await?;
        let session = session_for(&staff);

        for amount in [0, -500] {
            let result = process_payment(
                &db,
                &session,
                shipment.id,
                PaymentArgs {
                    amount_cents: amount,
                    ..Default::default()
                },
            )
            .await;
            assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_payment_on_missing_shipment_writes_nothing() -> Result<()> {
        let (db, convo, _shipment) = setup_with_shipment().await?;
        let staff = create_test_user(&db, "Dana", "dana@example.com", Role::Staff).await?;
        let session = session_for(&staff);

        let result = process_payment(
            &db,
            &session,
            999,
            PaymentArgs {
                amount_cents: 1_000,
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::ShipmentNotFound { id: 999 })));

        // No stray status message on any conversation
        let messages = message::list_messages(&db, &session, convo.id).await?;
        assert!(messages.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_refunds_are_staff_only() -> Result<()> {
        let (db, _convo, shipment) = setup_with_shipment().await?;
        let client = create_test_user(&db, "Ana", "ana@example.com", Role::Client).await?;
        let result = process_refund(
            &db,
            &session_for(&client),
            shipment.id,
            PaymentArgs {
                amount_cents: 100,
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Unauthorized { .. })));
        Ok(())
    }
}
