//! PVZ Service Library
//!
//! Pickup point registration, intake receptions and the products received
//! through them, served over an authenticated JSON API.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, patch, post},
    Extension, Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use slog::Logger;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::{AuthRouterExt, AuthService};
use crate::entities::user::UserRole;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
    pub auth: Arc<AuthService>,
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    pub(crate) fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            meta: Some(ResponseMeta::capture()),
        }
    }
}


/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Business routes with their role gates.
pub fn api_routes() -> Router<AppState> {
    let public = Router::new()
        .route("/dummyLogin", post(handlers::users::dummy_login))
        .route("/register", post(handlers::users::register))
        .route("/login", post(handlers::users::login));

    let pvz_create = Router::new()
        .route("/pvz", post(handlers::pickup_points::create_pickup_point))
        .with_roles(&[UserRole::Moderator]);

    let pvz_read = Router::new()
        .route("/pvz", get(handlers::pickup_points::list_pickup_points))
        .with_roles(&[UserRole::Employee, UserRole::Moderator]);

    let intake = Router::new()
        .route("/receptions", post(handlers::receptions::create_reception))
        .route(
            "/pvz/:pvzId/close_last_reception",
            patch(handlers::receptions::close_last_reception),
        )
        .route("/products", post(handlers::products::add_product))
        .route(
            "/pvz/:pvzId/delete_last_product",
            delete(handlers::products::delete_last_product),
        )
        .with_roles(&[UserRole::Employee]);

    Router::new()
        .merge(public)
        .merge(pvz_create)
        .merge(pvz_read)
        .merge(intake)
}

/// Full application router: business routes, health, metrics and docs,
/// wrapped in request id, tracing, logging and metrics middleware.
pub fn build_router(state: AppState, logger: Logger) -> Router {
    let auth_service = state.auth.clone();

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_export))
        .merge(api_routes())
        .merge(openapi::swagger_ui())
        .layer(axum::middleware::from_fn(metrics::track_http_metrics))
        .layer(Extension(auth_service))
        .layer(axum::middleware::from_fn_with_state(
            logger,
            logging::logging_middleware,
        ))
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Response {
    let db_status = match db::check_connection(&state.db).await {
        Ok(()) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": { "database": db_status },
        "timestamp": Utc::now().to_rfc3339(),
    });

    let status = if db_status == "healthy" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ApiResponse::<Value>::success(health_data))).into_response()
}

async fn metrics_export() -> Response {
    match metrics::metrics_handler().await {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            String::from("metrics error"),
        )
            .into_response(),
    }
}
