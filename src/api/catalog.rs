//! Product catalog and quote template routes.

use super::{ApiError, AppState};
use crate::auth::Session;
use crate::core::{product as product_core, quote as quote_core};
use crate::entities::{product, quote_template};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub sku: String,
    pub name: String,
    pub price_cents: i64,
    #[serde(default)]
    pub description: Option<String>,
}

pub async fn create_product(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CreateProductRequest>,
) -> Result<Json<product::Model>, ApiError> {
    Ok(Json(
        product_core::create_product(
            &state.db,
            &session,
            req.sku,
            req.name,
            req.price_cents,
            req.description,
        )
        .await?,
    ))
}

pub async fn list_products(
    State(state): State<AppState>,
    _session: Session,
) -> Result<Json<Vec<product::Model>>, ApiError> {
    Ok(Json(product_core::list_products(&state.db).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

pub async fn update_product(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<product::Model>, ApiError> {
    Ok(Json(
        product_core::update_product(
            &state.db,
            &session,
            id,
            req.name,
            req.price_cents,
            req.description,
        )
        .await?,
    ))
}

pub async fn delete_product(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<Json<product::Model>, ApiError> {
    Ok(Json(
        product_core::delete_product(&state.db, &session, id).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub default_price_cents: i64,
}

pub async fn create_template(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CreateTemplateRequest>,
) -> Result<Json<quote_template::Model>, ApiError> {
    Ok(Json(
        quote_core::create_template(
            &state.db,
            &session,
            req.title,
            req.body,
            req.default_price_cents,
        )
        .await?,
    ))
}

pub async fn list_templates(
    State(state): State<AppState>,
    _session: Session,
) -> Result<Json<Vec<quote_template::Model>>, ApiError> {
    Ok(Json(quote_core::list_templates(&state.db).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateTemplateRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub default_price_cents: Option<i64>,
}

pub async fn update_template(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTemplateRequest>,
) -> Result<Json<quote_template::Model>, ApiError> {
    Ok(Json(
        quote_core::update_template(
            &state.db,
            &session,
            id,
            req.title,
            req.body,
            req.default_price_cents,
        )
        .await?,
    ))
}

pub async fn delete_template(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    quote_core::delete_template(&state.db, &session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
