//! Conversation and message routes.

use super::{ApiError, AppState};
use crate::auth::Session;
use crate::core::{conversation as convo_core, message as message_core};
use crate::entities::enums::{ConversationKind, MessageKind};
use crate::entities::{conversation, message};
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    pub title: String,
    pub kind: ConversationKind,
    #[serde(default)]
    pub participant_ids: Vec<i64>,
}

pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CreateConversationRequest>,
) -> Result<Json<conversation::Model>, ApiError> {
    crate::core::access::require_staff(&session, "Creating conversations")?;
    let convo = convo_core::create_conversation(
        &state.db,
        req.title,
        req.kind,
        req.participant_ids,
    )
    .await?;
    Ok(Json(convo))
}

pub async fn list(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<conversation::Model>>, ApiError> {
    Ok(Json(
        convo_core::list_conversations(&state.db, &session).await?,
    ))
}

pub async fn fetch(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Json<conversation::Model>, ApiError> {
    Ok(Json(
        convo_core::get_conversation(&state.db, &session, id).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub kind: MessageKind,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

pub async fn send_message(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<message::Model>, ApiError> {
    let sent = message_core::send_message(
        &state.db,
        &session,
        id,
        req.kind,
        req.body,
        req.payload,
    )
    .await?;
    Ok(Json(sent))
}

pub async fn list_messages(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Json<Vec<message::Model>>, ApiError> {
    Ok(Json(
        message_core::list_messages(&state.db, &session, id).await?,
    ))
}
