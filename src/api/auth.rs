//! Login and identity routes.

use super::{ApiError, AppState};
use crate::auth::Session;
use crate::core::user as user_core;
use crate::entities::user;
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: user::Model,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (token, user) = crate::auth::login(&state.db, &req.email, &state.jwt_secret).await?;
    Ok(Json(LoginResponse { token, user }))
}

pub async fn me(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<user::Model>, ApiError> {
    let user = user_core::get_user_by_id(&state.db, session.user_id)
        .await?
        .ok_or(crate::errors::Error::UserNotFound {
            ident: session.user_id.to_string(),
        })?;
    Ok(Json(user))
}

pub async fn list_users(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<user::Model>>, ApiError> {
    Ok(Json(user_core::list_users(&state.db, &session).await?))
}
