//! Document upload, download, and review routes.
//!
//! Uploads are raw request bodies: metadata rides in query parameters and
//! the `Content-Type` header, bytes go straight to the blob store.

use super::{ApiError, AppState};
use crate::auth::Session;
use crate::core::document as document_core;
use crate::entities::document;
use crate::entities::enums::DocumentCategory;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub file_name: String,
    pub category: DocumentCategory,
    #[serde(default)]
    pub shipment_id: Option<i64>,
}

pub async fn upload(
    State(state): State<AppState>,
    session: Session,
    Path(conversation_id): Path<i64>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<document::Model>, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let blob_id = state.blobs.put(&body).await?;
    let doc = document_core::register_document(
        &state.db,
        &session,
        document_core::NewDocument {
            conversation_id,
            shipment_id: params.shipment_id,
            blob_id,
            file_name: params.file_name,
            content_type,
            size_bytes: body.len() as i64,
            category: params.category,
        },
    )
    .await?;
    Ok(Json(doc))
}

pub async fn download(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let doc = document_core::get_document(&state.db, &session, id).await?;
    let bytes = state.blobs.get(&doc.blob_id).await?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, doc.content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", doc.file_name),
            ),
        ],
        bytes,
    ))
}

pub async fn list_for_conversation(
    State(state): State<AppState>,
    session: Session,
    Path(conversation_id): Path<i64>,
) -> Result<Json<Vec<document::Model>>, ApiError> {
    Ok(Json(
        document_core::list_documents_for_conversation(&state.db, &session, conversation_id)
            .await?,
    ))
}

pub async fn list_all(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<document::Model>>, ApiError> {
    Ok(Json(
        document_core::list_all_documents(&state.db, &session).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub approve: bool,
}

pub async fn review(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<document::Model>, ApiError> {
    Ok(Json(
        document_core::review_document(&state.db, &session, id, req.approve).await?,
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    document_core::delete_document(&state.db, &session, &state.blobs, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
