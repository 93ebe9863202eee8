//! Quote templates and the quote-request intake fan-out.
//!
//! A submitted quote request fans out into a conversation, a shipment at
//! `quote_requested`, and an opening status message, all in one
//! transaction. The status message carries enough of the request to
//! reconstruct the shipment later (see maintenance backfill).

use crate::auth::Session;
use crate::core::{
    access,
    message::{self, StatusEvent, StatusPayload},
    shipment as shipment_core,
};
use crate::entities::{
    QuoteTemplate, QuoteTemplateColumn,
    conversation,
    enums::{ConversationKind, MessageKind},
    quote_request, quote_template, shipment,
};
use crate::errors::{Error, Result};
use sea_orm::{DatabaseConnection, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// A filled-in quote request form.
#[derive(Debug, Clone)]
pub struct QuoteRequestForm {
    pub pet_name: String,
    pub pet_type: String,
    pub breed: Option<String>,
    pub weight_kg: Option<f64>,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: Option<String>,
    pub origin: String,
    pub destination: String,
    pub notes: Option<String>,
}

/// Everything a quote request fans out into.
#[derive(Debug)]
pub struct QuoteIntake {
    pub request: quote_request::Model,
    pub conversation: conversation::Model,
    pub shipment: shipment::Model,
}

/// Submits a quote request: records it and fans out the conversation,
/// shipment, and opening status message in one transaction.
pub async fn submit_quote_request(
    db: &DatabaseConnection,
    session: &Session,
    form: QuoteRequestForm,
) -> Result<QuoteIntake> {
    for (field, value) in [
        ("pet_name", &form.pet_name),
        ("pet_type", &form.pet_type),
        ("owner_name", &form.owner_name),
        ("origin", &form.origin),
        ("destination", &form.destination),
    ] {
        if value.trim().is_empty() {
            return Err(Error::Config {
                message: format!("Quote request field '{field}' cannot be empty"),
            });
        }
    }
    if !form.owner_email.contains('@') {
        return Err(Error::Config {
            message: format!("Invalid owner email: {}", form.owner_email),
        });
    }

    let txn = db.begin().await?;

    let request = quote_request::ActiveModel {
        submitter_id: Set(session.user_id),
        pet_name: Set(form.pet_name.clone()),
        pet_type: Set(form.pet_type.clone()),
        breed: Set(form.breed.clone()),
        weight_kg: Set(form.weight_kg),
        owner_name: Set(form.owner_name.clone()),
        owner_email: Set(form.owner_email.clone()),
        owner_phone: Set(form.owner_phone.clone()),
        origin: Set(form.origin.clone()),
        destination: Set(form.destination.clone()),
        notes: Set(form.notes),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let request = request.insert(&txn).await?;

    // Staff see every conversation regardless, but listing them as
    // participants keeps the thread self-describing
    let staff_ids: Vec<i64> = crate::entities::User::find()
        .filter(
            crate::entities::UserColumn::Role
                .is_in([crate::entities::enums::Role::Admin, crate::entities::enums::Role::Staff]),
        )
        .all(&txn)
        .await?
        .into_iter()
        .map(|u| u.id)
        .collect();
    let mut participant_ids = vec![session.user_id];
    participant_ids.extend(staff_ids.into_iter().filter(|id| *id != session.user_id));

    let title = format!(
        "Quote: {} {} -> {}",
        form.pet_name, form.origin, form.destination
    );
    let conversation = crate::core::conversation::create_conversation(
        &txn,
        title,
        ConversationKind::Client,
        participant_ids,
    )
    .await?;

    let shipment = shipment_core::create_shipment(
        &txn,
        shipment_core::NewShipment {
            conversation_id: conversation.id,
            pet_name: form.pet_name.clone(),
            pet_type: form.pet_type.clone(),
            breed: form.breed,
            weight_kg: form.weight_kg,
            owner_name: form.owner_name.clone(),
            owner_email: form.owner_email.clone(),
            owner_phone: form.owner_phone,
            origin: form.origin.clone(),
            destination: form.destination.clone(),
        },
    )
    .await?;

    let payload = StatusPayload::new(StatusEvent::QuoteRequested)
        .with_detail("quote_request_id", serde_json::json!(request.id))
        .with_detail("shipment_id", serde_json::json!(shipment.id))
        .with_detail("pet_name", serde_json::json!(form.pet_name))
        .with_detail("pet_type", serde_json::json!(form.pet_type))
        .with_detail("origin", serde_json::json!(form.origin))
        .with_detail("destination", serde_json::json!(form.destination))
        .with_detail("owner_name", serde_json::json!(form.owner_name))
        .with_detail("owner_email", serde_json::json!(form.owner_email));
    message::post_status(&txn, conversation.id, session.user_id, &payload).await?;

    txn.commit().await?;
    info!(
        "Quote request {} fanned out to conversation {} / shipment {}",
        request.id, conversation.id, shipment.id
    );
    Ok(QuoteIntake {
        request,
        conversation,
        shipment,
    })
}

/// Sends a quote into a conversation, from a template or explicit terms.
/// Staff only; the quote message advances the shipment to `quote_sent`.
pub async fn send_quote(
    db: &DatabaseConnection,
    session: &Session,
    conversation_id: i64,
    template_id: Option<i64>,
    title: Option<String>,
    price_cents: Option<i64>,
) -> Result<crate::entities::message::Model> {
    access::require_staff(session, "Sending quotes")?;

    let (title, price_cents, body) = match template_id {
        Some(id) => {
            let template = get_template(db, id).await?;
            (
                title.unwrap_or(template.title),
                price_cents.unwrap_or(template.default_price_cents),
                Some(template.body),
            )
        }
        None => {
            let title = title.ok_or_else(|| Error::Config {
                message: "A quote needs a template or an explicit title".to_string(),
            })?;
            let price = price_cents.ok_or_else(|| Error::Config {
                message: "A quote needs a template or an explicit price".to_string(),
            })?;
            (title, price, None)
        }
    };

    let payload = serde_json::to_value(message::QuotePayload { title, price_cents })?;
    message::send_message(
        db,
        session,
        conversation_id,
        MessageKind::Quote,
        body,
        Some(payload),
    )
    .await
}

/// Creates a quote template. Staff only.
pub async fn create_template(
    db: &DatabaseConnection,
    session: &Session,
    title: String,
    body: String,
    default_price_cents: i64,
) -> Result<quote_template::Model> {
    access::require_staff(session, "Creating quote templates")?;
    if title.trim().is_empty() {
        return Err(Error::Config {
            message: "Template title cannot be empty".to_string(),
        });
    }
    if default_price_cents < 0 {
        return Err(Error::InvalidAmount {
            amount_cents: default_price_cents,
        });
    }

    let now = chrono::Utc::now();
    let template = quote_template::ActiveModel {
        title: Set(title.trim().to_string()),
        body: Set(body),
        default_price_cents: Set(default_price_cents),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    template.insert(db).await.map_err(Into::into)
}

/// Fetches one template.
pub async fn get_template(
    db: &DatabaseConnection,
    template_id: i64,
) -> Result<quote_template::Model> {
    QuoteTemplate::find_by_id(template_id)
        .one(db)
        .await?
        .ok_or(Error::TemplateNotFound { id: template_id })
}

/// Lists templates ordered by title.
pub async fn list_templates(db: &DatabaseConnection) -> Result<Vec<quote_template::Model>> {
    QuoteTemplate::find()
        .order_by_asc(QuoteTemplateColumn::Title)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Updates a template. Staff only.
pub async fn update_template(
    db: &DatabaseConnection,
    session: &Session,
    template_id: i64,
    title: Option<String>,
    body: Option<String>,
    default_price_cents: Option<i64>,
) -> Result<quote_template::Model> {
    access::require_staff(session, "Updating quote templates")?;

    let template = get_template(db, template_id).await?;
    let mut active: quote_template::ActiveModel = template.into();
    if let Some(title) = title {
        if title.trim().is_empty() {
            return Err(Error::Config {
                message: "Template title cannot be empty".to_string(),
            });
        }
        active.title = Set(title.trim().to_string());
    }
    if let Some(body) = body {
        active.body = Set(body);
    }
    if let Some(price) = default_price_cents {
        if price < 0 {
            return Err(Error::InvalidAmount {
                amount_cents: price,
            });
        }
        active.default_price_cents = Set(price);
    }
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Deletes a template. Staff only.
pub async fn delete_template(
    db: &DatabaseConnection,
    session: &Session,
    template_id: i64,
) -> Result<()> {
    access::require_staff(session, "Deleting quote templates")?;
    let template = get_template(db, template_id).await?;
    quote_template::ActiveModel::from(template).delete(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::message::list_messages;
    use crate::entities::enums::{Role, ShipmentStatus};
    use crate::test_utils::*;

    fn rex_form() -> QuoteRequestForm {
        QuoteRequestForm {
            pet_name: "Rex".to_string(),
            pet_type: "dog".to_string(),
            breed: Some("Labrador".to_string()),
            weight_kg: Some(31.5),
            owner_name: "Ana Diaz".to_string(),
            owner_email: "ana@example.com".to_string(),
            owner_phone: None,
            origin: "LAX".to_string(),
            destination: "GUM".to_string(),
            notes: Some("First flight".to_string()),
        }
    }

    #[tokio::test]
    async fn test_intake_fans_out() -> Result<()> {
        let db = setup_test_db().await?;
        let ana = create_test_user(&db, "Ana", "ana@example.com", Role::Client).await?;
        let session = session_for(&ana);

        let intake = submit_quote_request(&db, &session, rex_form()).await?;

        // Conversation: submitter is a participant, title names the route
        assert_eq!(intake.conversation.participants(), vec![ana.id]);
        assert!(intake.conversation.title.contains("Rex"));
        assert!(intake.conversation.title.contains("LAX"));

        // Shipment: bound to the conversation, at quote_requested
        assert_eq!(intake.shipment.conversation_id, intake.conversation.id);
        assert_eq!(intake.shipment.status, ShipmentStatus::QuoteRequested);
        assert_eq!(intake.shipment.pet_name, "Rex");

        // Opening status message carries the request details
        let messages = list_messages(&db, &session, intake.conversation.id).await?;
        assert_eq!(messages.len(), 1);
        let payload: StatusPayload =
            serde_json::from_value(messages[0].payload.clone().unwrap())?;
        assert_eq!(payload.event, StatusEvent::QuoteRequested);
        assert_eq!(
            payload.details.get("pet_name"),
            Some(&serde_json::json!("Rex"))
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_intake_validates_form() -> Result<()> {
        let db = setup_test_db().await?;
        let ana = create_test_user(&db, "Ana", "ana@example.com", Role::Client).await?;
        let session = session_for(&ana);

        let mut form = rex_form();
        form.pet_name = " ".to_string();
        let result = submit_quote_request(&db, &session, form).await;
        assert!(matches!(result, Err(Error::Config { .. })));

        let mut form = rex_form();
        form.owner_email = "not-an-email".to_string();
        let result = submit_quote_request(&db, &session, form).await;
        assert!(matches!(result, Err(Error::Config { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_send_quote_from_template() -> Result<()> {
        let db = setup_test_db().await?;
        let ana = create_test_user(&db, "Ana", "ana@example.com", Role::Client).await?;
        let staff = create_test_user(&db, "Dana", "dana@example.com", Role::Staff).await?;
        let staff_session = session_for(&staff);

        let intake = submit_quote_request(&db, &session_for(&ana), rex_form()).await?;
        let template = create_template(
            &db,
            &staff_session,
            "Domestic air".to_string(),
            "Door-to-door air transport.".to_string(),
            250_000,
        )
        .await?;

        let sent = send_quote(
            &db,
            &staff_session,
            intake.conversation.id,
            Some(template.id),
            None,
            None,
        )
        .await?;
        let payload: message::QuotePayload =
            serde_json::from_value(sent.payload.clone().unwrap())?;
        assert_eq!(payload.title, "Domestic air");
        assert_eq!(payload.price_cents, 250_000);

        // Quote message advanced the shipment
        let shipment =
            shipment_core::get_shipment(&db, &staff_session, intake.shipment.id).await?;
        assert_eq!(shipment.status, ShipmentStatus::QuoteSent);
        Ok(())
    }

    #[tokio::test]
    async fn test_send_quote_needs_terms() -> Result<()> {
        let db = setup_test_db().await?;
        let staff = create_test_user(&db, "Dana", "dana@example.com", Role::Staff).await?;
        let convo = create_test_conversation(&db, "Rex to Guam", &[]).await?;

        let result =
            send_quote(&db, &session_for(&staff), convo.id, None, None, None).await;
        assert!(matches!(result, Err(Error::Config { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_template_crud_is_staff_gated() -> Result<()> {
        let db = setup_test_db().await?;
        let staff = create_test_user(&db, "Dana", "dana@example.com", Role::Staff).await?;
        let client = create_test_user(&db, "Ana", "ana@example.com", Role::Client).await?;
        let staff_session = session_for(&staff);

        let result = create_template(
            &db,
            &session_for(&client),
            "T".to_string(),
            String::new(),
            0,
        )
        .await;
        assert!(matches!(result, Err(Error::Unauthorized { .. })));

        let template = create_template(
            &db,
            &staff_session,
            "Domestic air".to_string(),
            "Body".to_string(),
            100,
        )
        .await?;
        let updated = update_template(
            &db,
            &staff_session,
            template.id,
            None,
            None,
            Some(200),
        )
        .await?;
        assert_eq!(updated.default_price_cents, 200);

        delete_template(&db, &staff_session, template.id).await?;
        let result = get_template(&db, template.id).await;
        assert!(matches!(result, Err(Error::TemplateNotFound { .. })));
        Ok(())
    }
}
