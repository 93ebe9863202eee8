//! Admin maintenance routes. All require the admin role.

use super::{ApiError, AppState};
use crate::auth::Session;
use crate::config::seed::SeedConfig;
use crate::core::maintenance;
use crate::entities::enums::Role;
use crate::errors::Error;
use axum::{Json, extract::State};
use serde::Serialize;

fn require_admin(session: &Session) -> Result<(), Error> {
    if session.role == Role::Admin {
        Ok(())
    } else {
        Err(Error::Unauthorized {
            message: "Maintenance operations require the admin role".to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub users: usize,
    pub products: usize,
    pub quote_templates: usize,
}

pub async fn seed(
    State(state): State<AppState>,
    session: Session,
    Json(config): Json<SeedConfig>,
) -> Result<Json<SeedResponse>, ApiError> {
    require_admin(&session)?;
    let report = maintenance::seed_fixtures(&state.db, &config).await?;
    Ok(Json(SeedResponse {
        users: report.users,
        products: report.products,
        quote_templates: report.quote_templates,
    }))
}

pub async fn clear(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&session)?;
    maintenance::clear_all_data(&state.db).await?;
    Ok(Json(serde_json::json!({ "cleared": true })))
}

pub async fn backfill_shipments(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&session)?;
    let created = maintenance::backfill_missing_shipments(&state.db).await?;
    Ok(Json(serde_json::json!({ "shipments_created": created })))
}
