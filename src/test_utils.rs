//! Shared fixtures for unit tests.

use crate::auth::Session;
use crate::config::database::create_tables;
use crate::core::{conversation as convo_core, shipment as shipment_core, user as user_core};
use crate::entities::enums::{ConversationKind, Role};
use crate::entities::{conversation, shipment, user};
use crate::errors::Result;
use sea_orm::{Database, DatabaseConnection};

/// Fresh in-memory database with all tables created.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    create_tables(&db).await?;
    Ok(db)
}

pub async fn create_test_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    role: Role,
) -> Result<user::Model> {
    user_core::create_user(db, name.to_string(), email.to_string(), role, None).await
}

/// Session as it would come out of a verified token for this user.
#[must_use]
pub fn session_for(user: &user::Model) -> Session {
    Session {
        user_id: user.id,
        role: user.role,
    }
}

pub async fn create_test_conversation(
    db: &DatabaseConnection,
    title: &str,
    participant_ids: &[i64],
) -> Result<conversation::Model> {
    convo_core::create_conversation(
        db,
        title.to_string(),
        ConversationKind::Client,
        participant_ids.to_vec(),
    )
    .await
}

pub async fn create_test_shipment(
    db: &DatabaseConnection,
    conversation_id: i64,
) -> Result<shipment::Model> {
    shipment_core::create_shipment(
        db,
        shipment_core::NewShipment {
            conversation_id,
            pet_name: "Rex".to_string(),
            pet_type: "dog".to_string(),
            breed: Some("Labrador".to_string()),
            weight_kg: Some(31.5),
            owner_name: "Ana Diaz".to_string(),
            owner_email: "ana@example.com".to_string(),
            owner_phone: None,
            origin: "LAX".to_string(),
            destination: "GUM".to_string(),
        },
    )
    .await
}

/// Database plus one conversation with no participants.
pub async fn setup_with_conversation() -> Result<(DatabaseConnection, conversation::Model)> {
    let db = setup_test_db().await?;
    let convo = create_test_conversation(&db, "Rex to Guam", &[]).await?;
    Ok((db, convo))
}

/// Database, conversation, and a freshly created shipment on it.
pub async fn setup_with_shipment()
-> Result<(DatabaseConnection, conversation::Model, shipment::Model)> {
    let (db, convo) = setup_with_conversation().await?;
    let shipment = create_test_shipment(&db, convo.id).await?;
    Ok((db, convo, shipment))
}
