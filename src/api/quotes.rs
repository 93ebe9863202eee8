//! Quote intake and quote sending routes.

use super::{ApiError, AppState};
use crate::auth::Session;
use crate::core::quote as quote_core;
use crate::entities::{conversation, message, quote_request, shipment};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct QuoteRequestBody {
    pub pet_name: String,
    pub pet_type: String,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    pub owner_name: String,
    pub owner_email: String,
    #[serde(default)]
    pub owner_phone: Option<String>,
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuoteIntakeResponse {
    pub request: quote_request::Model,
    pub conversation: conversation::Model,
    pub shipment: shipment::Model,
}

pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<QuoteRequestBody>,
) -> Result<(StatusCode, Json<QuoteIntakeResponse>), ApiError> {
    let intake = quote_core::submit_quote_request(
        &state.db,
        &session,
        quote_core::QuoteRequestForm {
            pet_name: req.pet_name,
            pet_type: req.pet_type,
            breed: req.breed,
            weight_kg: req.weight_kg,
            owner_name: req.owner_name,
            owner_email: req.owner_email,
            owner_phone: req.owner_phone,
            origin: req.origin,
            destination: req.destination,
            notes: req.notes,
        },
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(QuoteIntakeResponse {
            request: intake.request,
            conversation: intake.conversation,
            shipment: intake.shipment,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct SendQuoteRequest {
    #[serde(default)]
    pub template_id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price_cents: Option<i64>,
}

pub async fn send_quote(
    State(state): State<AppState>,
    session: Session,
    Path(conversation_id): Path<i64>,
    Json(req): Json<SendQuoteRequest>,
) -> Result<Json<message::Model>, ApiError> {
    Ok(Json(
        quote_core::send_quote(
            &state.db,
            &session,
            conversation_id,
            req.template_id,
            req.title,
            req.price_cents,
        )
        .await?,
    ))
}
