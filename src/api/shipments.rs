//! Shipment, billing, and payment routes.

use super::{ApiError, AppState};
use crate::auth::Session;
use crate::core::{
    payment::{self, LineItem, PaymentArgs, PaymentSummary},
    shipment as shipment_core,
};
use crate::entities::enums::ShipmentStatus;
use crate::entities::shipment;
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateShipmentRequest {
    pub conversation_id: i64,
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
}

pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CreateShipmentRequest>,
) -> Result<Json<shipment::Model>, ApiError> {
    crate::core::access::require_staff(&session, "Creating shipments")?;
    let created = shipment_core::create_shipment(
        &state.db,
        shipment_core::NewShipment {
            conversation_id: req.conversation_id,
            pet_name: req.pet_name,
            pet_type: req.pet_type,
            breed: req.breed,
            weight_kg: req.weight_kg,
            owner_name: req.owner_name,
            owner_email: req.owner_email,
            owner_phone: req.owner_phone,
            origin: req.origin,
            destination: req.destination,
        },
    )
    .await?;
    Ok(Json(created))
}

pub async fn list(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<shipment::Model>>, ApiError> {
    Ok(Json(
        shipment_core::list_shipments(&state.db, &session).await?,
    ))
}

pub async fn fetch(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Json<shipment::Model>, ApiError> {
    Ok(Json(
        shipment_core::get_shipment(&state.db, &session, id).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ShipmentStatus,
}

pub async fn update_status(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<shipment::Model>, ApiError> {
    Ok(Json(
        shipment_core::update_status(&state.db, &session, id, req.status).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateFlightRequest {
    #[serde(default)]
    pub flight_number: Option<String>,
    #[serde(default)]
    pub departure_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub arrival_at: Option<chrono::DateTime<chrono::Utc>>,
}

pub async fn update_flight(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Json(req): Json<UpdateFlightRequest>,
) -> Result<Json<shipment::Model>, ApiError> {
    Ok(Json(
        shipment_core::update_flight(
            &state.db,
            &session,
            id,
            req.flight_number,
            req.departure_at,
            req.arrival_at,
        )
        .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct SetBillingRequest {
    #[serde(default)]
    pub line_items: Option<Vec<LineItem>>,
    #[serde(default)]
    pub total_amount_cents: Option<i64>,
}

pub async fn set_billing(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Json(req): Json<SetBillingRequest>,
) -> Result<Json<shipment::Model>, ApiError> {
    Ok(Json(
        payment::set_billing(
            &state.db,
            &session,
            id,
            req.line_items,
            req.total_amount_cents,
        )
        .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct LedgerEntryRequest {
    pub amount_cents: i64,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<LedgerEntryRequest> for PaymentArgs {
    fn from(req: LedgerEntryRequest) -> Self {
        Self {
            amount_cents: req.amount_cents,
            method: req.method,
            reference: req.reference,
            notes: req.notes,
        }
    }
}

pub async fn record_payment(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Json(req): Json<LedgerEntryRequest>,
) -> Result<Json<shipment::Model>, ApiError> {
    Ok(Json(
        payment::process_payment(&state.db, &session, id, req.into()).await?,
    ))
}

pub async fn record_refund(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Json(req): Json<LedgerEntryRequest>,
) -> Result<Json<shipment::Model>, ApiError> {
    Ok(Json(
        payment::process_refund(&state.db, &session, id, req.into()).await?,
    ))
}

pub async fn payment_summary(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<PaymentSummary>>, ApiError> {
    Ok(Json(
        payment::payment_summary(&state.db, &session).await?,
    ))
}
