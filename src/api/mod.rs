//! HTTP API surface: router, shared state, auth extraction, and error
//! mapping. Handlers stay thin; all rules live in [`crate::core`].

use crate::auth::Session;
use crate::errors::Error;
use crate::storage::BlobStore;
use axum::{
    Json, Router,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod admin;
mod auth;
mod catalog;
mod conversations;
mod documents;
mod quotes;
mod shipments;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: String,
    pub blobs: BlobStore,
}

/// Error wrapper that maps domain errors onto HTTP statuses.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::ConversationNotFound { .. }
            | Error::ShipmentNotFound { .. }
            | Error::DocumentNotFound { .. }
            | Error::ProductNotFound { .. }
            | Error::TemplateNotFound { .. }
            | Error::UserNotFound { .. } => StatusCode::NOT_FOUND,
            Error::Unauthorized { .. } | Error::Token(_) => StatusCode::UNAUTHORIZED,
            Error::InvalidTransition { .. }
            | Error::InvalidAmount { .. }
            | Error::Config { .. }
            | Error::Json(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::ShipmentExists { .. } => StatusCode::CONFLICT,
            Error::Database(_) | Error::Io(_) | Error::EnvVar(_) => {
                tracing::error!("Internal error serving request: {}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

/// Pulls a verified [`Session`] out of the `Authorization: Bearer` header.
#[axum::async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                ApiError(Error::Unauthorized {
                    message: "Missing bearer token".to_string(),
                })
            })?;

        crate::auth::verify_token(token, &state.jwt_secret).map_err(ApiError)
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/users", get(auth::list_users))
        .route(
            "/api/v1/conversations",
            get(conversations::list).post(conversations::create),
        )
        .route("/api/v1/conversations/:id", get(conversations::fetch))
        .route(
            "/api/v1/conversations/:id/messages",
            get(conversations::list_messages).post(conversations::send_message),
        )
        .route(
            "/api/v1/conversations/:id/documents",
            get(documents::list_for_conversation).post(documents::upload),
        )
        .route("/api/v1/shipments", get(shipments::list).post(shipments::create))
        .route("/api/v1/shipments/:id", get(shipments::fetch))
        .route("/api/v1/shipments/:id/status", put(shipments::update_status))
        .route("/api/v1/shipments/:id/flight", put(shipments::update_flight))
        .route("/api/v1/shipments/:id/billing", put(shipments::set_billing))
        .route("/api/v1/shipments/:id/payments", post(shipments::record_payment))
        .route("/api/v1/shipments/:id/refunds", post(shipments::record_refund))
        .route("/api/v1/payments/summary", get(shipments::payment_summary))
        .route("/api/v1/documents", get(documents::list_all))
        .route(
            "/api/v1/documents/:id",
            get(documents::download).delete(documents::delete),
        )
        .route("/api/v1/documents/:id/review", put(documents::review))
        .route("/api/v1/products", get(catalog::list_products).post(catalog::create_product))
        .route(
            "/api/v1/products/:id",
            put(catalog::update_product).delete(catalog::delete_product),
        )
        .route(
            "/api/v1/quote-templates",
            get(catalog::list_templates).post(catalog::create_template),
        )
        .route(
            "/api/v1/quote-templates/:id",
            put(catalog::update_template).delete(catalog::delete_template),
        )
        .route("/api/v1/quote-requests", post(quotes::submit))
        .route("/api/v1/conversations/:id/quote", post(quotes::send_quote))
        .route("/api/v1/admin/seed", post(admin::seed))
        .route("/api/v1/admin/clear", post(admin::clear))
        .route("/api/v1/admin/backfill-shipments", post(admin::backfill_shipments))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
