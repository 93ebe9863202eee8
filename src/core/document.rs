//! Document metadata and review workflow.
//!
//! Bytes live in the blob store; this module owns the metadata rows and the
//! staff review loop (pending -> approved/rejected). Visibility follows the
//! owning conversation.

use crate::auth::Session;
use crate::core::access;
use crate::entities::{
    Document, DocumentColumn,
    document,
    enums::{DocumentCategory, DocumentStatus},
};
use crate::errors::{Error, Result};
use crate::storage::BlobStore;
use sea_orm::{DatabaseConnection, QueryOrder, Set, prelude::*};
use tracing::info;

/// Arguments for registering an uploaded document.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub conversation_id: i64,
    pub shipment_id: Option<i64>,
    pub blob_id: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub category: DocumentCategory,
}

/// Registers a stored blob as a document on a conversation the caller can
/// see. New documents start pending review.
pub async fn register_document(
    db: &DatabaseConnection,
    session: &Session,
    args: NewDocument,
) -> Result<document::Model> {
    // Visibility check doubles as existence check
    crate::core::conversation::get_conversation(db, session, args.conversation_id).await?;

    let document = document::ActiveModel {
        conversation_id: Set(args.conversation_id),
        shipment_id: Set(args.shipment_id),
        blob_id: Set(args.blob_id),
        file_name: Set(args.file_name),
        content_type: Set(args.content_type),
        size_bytes: Set(args.size_bytes),
        category: Set(args.category),
        status: Set(DocumentStatus::Pending),
        uploaded_by: Set(session.user_id),
        reviewed_by: Set(None),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    document.insert(db).await.map_err(Into::into)
}

/// Fetches one document, enforcing visibility through its conversation.
pub async fn get_document(
    db: &DatabaseConnection,
    session: &Session,
    document_id: i64,
) -> Result<document::Model> {
    let document = Document::find_by_id(document_id)
        .one(db)
        .await?
        .ok_or(Error::DocumentNotFound { id: document_id })?;

    if !session.role.is_staff() {
        crate::core::conversation::get_conversation(db, session, document.conversation_id)
            .await?;
    }
    Ok(document)
}

/// Lists a conversation's documents, newest first.
pub async fn list_documents_for_conversation(
    db: &DatabaseConnection,
    session: &Session,
    conversation_id: i64,
) -> Result<Vec<document::Model>> {
    crate::core::conversation::get_conversation(db, session, conversation_id).await?;

    Document::find()
        .filter(DocumentColumn::ConversationId.eq(conversation_id))
        .order_by_desc(DocumentColumn::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists every document in the system, newest first. Staff only; used for
/// the review queue.
pub async fn list_all_documents(
    db: &DatabaseConnection,
    session: &Session,
) -> Result<Vec<document::Model>> {
    access::require_staff(session, "Listing all documents")?;
    Document::find()
        .order_by_desc(DocumentColumn::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Approves or rejects a document, recording the reviewer. Staff only.
pub async fn review_document(
    db: &DatabaseConnection,
    session: &Session,
    document_id: i64,
    approve: bool,
) -> Result<document::Model> {
    access::require_staff(session, "Reviewing documents")?;

    let document = Document::find_by_id(document_id)
        .one(db)
        .await?
        .ok_or(Error::DocumentNotFound { id: document_id })?;

    let mut active: document::ActiveModel = document.into();
    active.status = Set(if approve {
        DocumentStatus::Approved
    } else {
        DocumentStatus::Rejected
    });
    active.reviewed_by = Set(Some(session.user_id));
    let result = active.update(db).await?;

    info!(
        "Document {} {} by user {}",
        document_id,
        if approve { "approved" } else { "rejected" },
        session.user_id
    );
    Ok(result)
}

/// Deletes a document and its blob. Staff only. The blob goes first so a
/// failure leaves the metadata row pointing at a still-existing blob rather
/// than the other way round.
pub async fn delete_document(
    db: &DatabaseConnection,
    session: &Session,
    blobs: &BlobStore,
    document_id: i64,
) -> Result<()> {
    access::require_staff(session, "Deleting documents")?;

    let document = Document::find_by_id(document_id)
        .one(db)
        .await?
        .ok_or(Error::DocumentNotFound { id: document_id })?;

    blobs.delete(&document.blob_id).await?;
    let blob_id = document.blob_id.clone();
    document::ActiveModel::from(document).delete(db).await?;

    info!("Deleted document {document_id} (blob {blob_id})");
    Ok(())
}
