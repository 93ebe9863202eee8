//! Operational maintenance: seeding, wiping, and repairing data.

use crate::config::seed::SeedConfig;
use crate::core::{
    message::{StatusEvent, StatusPayload},
    shipment as shipment_core, user,
};
use crate::entities::{
    Conversation, Document, Message, MessageColumn, Product, ProductColumn, QuoteRequest,
    QuoteTemplate, QuoteTemplateColumn, Shipment, User,
    enums::MessageKind,
};
use crate::errors::Result;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, warn};

/// Counts of rows inserted by a seeding run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub products: usize,
    pub quote_templates: usize,
}

/// Loads fixture users, products, and quote templates in one transaction.
///
/// Idempotent: rows whose natural key (email, SKU, template title) already
/// exists are skipped, so re-running against a seeded database inserts
/// nothing.
pub async fn seed_fixtures(db: &DatabaseConnection, config: &SeedConfig) -> Result<SeedReport> {
    let txn = db.begin().await?;
    let mut report = SeedReport::default();

    for seed in &config.users {
        let email = seed.email.trim().to_lowercase();
        if user::get_user_by_email(&txn, &email).await?.is_some() {
            continue;
        }
        user::create_user(
            &txn,
            seed.name.clone(),
            seed.email.clone(),
            seed.role,
            seed.organization.clone(),
        )
        .await?;
        report.users += 1;
    }

    for seed in &config.products {
        let existing = Product::find()
            .filter(ProductColumn::Sku.eq(seed.sku.trim()))
            .one(&txn)
            .await?;
        if existing.is_some() {
            continue;
        }
        let now = chrono::Utc::now();
        crate::entities::product::ActiveModel {
            sku: Set(seed.sku.trim().to_string()),
            name: Set(seed.name.clone()),
            price_cents: Set(seed.price_cents),
            description: Set(seed.description.clone()),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        report.products += 1;
    }

    for seed in &config.quote_templates {
        let existing = QuoteTemplate::find()
            .filter(QuoteTemplateColumn::Title.eq(seed.title.trim()))
            .one(&txn)
            .await?;
        if existing.is_some() {
            continue;
        }
        let now = chrono::Utc::now();
        crate::entities::quote_template::ActiveModel {
            title: Set(seed.title.trim().to_string()),
            body: Set(seed.body.clone()),
            default_price_cents: Set(seed.default_price_cents),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        report.quote_templates += 1;
    }

    txn.commit().await?;
    info!(
        "Seeded {} users, {} products, {} quote templates",
        report.users, report.products, report.quote_templates
    );
    Ok(report)
}

/// Deletes every row from every table. Destructive; admin surface only.
pub async fn clear_all_data(db: &DatabaseConnection) -> Result<()> {
    let txn = db.begin().await?;
    Message::delete_many().exec(&txn).await?;
    Document::delete_many().exec(&txn).await?;
    Shipment::delete_many().exec(&txn).await?;
    QuoteRequest::delete_many().exec(&txn).await?;
    Conversation::delete_many().exec(&txn).await?;
    Product::delete_many().exec(&txn).await?;
    QuoteTemplate::delete_many().exec(&txn).await?;
    User::delete_many().exec(&txn).await?;
    txn.commit().await?;
    warn!("Cleared all data");
    Ok(())
}

fn detail_str(payload: &StatusPayload, key: &str, fallback: &str) -> String {
    payload
        .details
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or(fallback)
        .to_string()
}

/// Rebuilds shipments for conversations that lost theirs.
///
/// A conversation qualifies when it has no shipment but does have a
/// `quote_requested` status message; the earliest such message supplies the
/// shipment fields, with placeholders for anything it omits. Returns the
/// number of shipments created.
pub async fn backfill_missing_shipments(db: &DatabaseConnection) -> Result<usize> {
    let conversations = Conversation::find().all(db).await?;
    let mut created = 0;

    for conversation in conversations {
        if shipment_core::get_shipment_for_conversation(db, conversation.id)
            .await?
            .is_some()
        {
            continue;
        }

        let messages = Message::find()
            .filter(MessageColumn::ConversationId.eq(conversation.id))
            .filter(MessageColumn::Kind.eq(MessageKind::Status))
            .order_by_asc(MessageColumn::CreatedAt)
            .order_by_asc(MessageColumn::Id)
            .all(db)
            .await?;

        let Some(payload) = messages.iter().find_map(|m| {
            let value = m.payload.as_ref()?;
            let payload: StatusPayload = serde_json::from_value(value.clone()).ok()?;
            (payload.event == StatusEvent::QuoteRequested).then_some(payload)
        }) else {
            continue;
        };

        let restored = shipment_core::create_shipment(
            db,
            shipment_core::NewShipment {
                conversation_id: conversation.id,
                pet_name: detail_str(&payload, "pet_name", "Unknown"),
                pet_type: detail_str(&payload, "pet_type", "unknown"),
                breed: None,
                weight_kg: None,
                owner_name: detail_str(&payload, "owner_name", "Unknown"),
                owner_email: detail_str(&payload, "owner_email", "unknown@unknown"),
                owner_phone: None,
                origin: detail_str(&payload, "origin", "Unknown"),
                destination: detail_str(&payload, "destination", "Unknown"),
            },
        )
        .await?;
        info!(
            "Backfilled shipment {} for conversation {}",
            restored.id, conversation.id
        );
        created += 1;
    }

    Ok(created)
}
