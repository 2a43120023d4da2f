#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{DateTime, Utc};
use pvz_service::{
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db,
    entities::{
        reception::{self, ReceptionStatus},
        user::UserRole,
    },
    handlers::AppServices,
    logging::discard_logger,
    AppState,
};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration_test_signing_key_0123456789_abcdef";

/// Full application router over a private in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Builds the app after letting the caller adjust the configuration.
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            TEST_JWT_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // One connection keeps every query on the same in-memory database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        adjust(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let auth_service = Arc::new(AuthService::new(AuthConfig::from(&cfg)));
        let logger = discard_logger();
        let services = AppServices::new(db_arc.clone(), auth_service.clone(), logger.clone());

        let state = AppState {
            db: db_arc,
            config: cfg,
            services,
            auth: auth_service,
        };

        let router = pvz_service::build_router(state.clone(), logger);

        Self { router, state }
    }

    /// Token for a role without a backing user record.
    pub fn token_for(&self, role: UserRole) -> String {
        self.state
            .auth
            .generate_token(None, role)
            .expect("token generation in tests")
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.oneshot(request).await
    }

    /// Sends a prebuilt request.
    pub async fn oneshot(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends a request and decodes the JSON body (`Null` when there is none).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body, token).await;
        let status = response.status();
        (status, response_json(response).await)
    }

    /// Sends a request carrying a dummy token for `role`.
    pub async fn send_as(
        &self,
        role: UserRole,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let token = self.token_for(role);
        self.send(method, uri, body, Some(&token)).await
    }

    /// Registers a pickup point as a moderator and returns its id.
    pub async fn create_pickup_point(&self, city: &str) -> Uuid {
        let (status, body) = self
            .send_as(
                UserRole::Moderator,
                Method::POST,
                "/pvz",
                Some(serde_json::json!({ "city": city })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create pvz failed: {body}");
        id_of(&body["data"])
    }

    /// Inserts a reception row directly, bypassing the service clock.
    pub async fn insert_reception_at(
        &self,
        pickup_point_id: Uuid,
        created_at: DateTime<Utc>,
        status: ReceptionStatus,
    ) -> reception::Model {
        reception::ActiveModel {
            id: Set(Uuid::new_v4()),
            pickup_point_id: Set(pickup_point_id),
            created_at: Set(created_at),
            status: Set(status),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("insert reception in tests")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

pub fn id_of(value: &Value) -> Uuid {
    value["id"]
        .as_str()
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .unwrap_or_else(|| panic!("no id in {value}"))
}
