/*!
 * # Authentication and Authorization Module
 *
 * Issues and validates the HS256 access tokens used by pickup point staff and
 * gates routes by role:
 *
 * - `employee` runs receptions and products at a pickup point
 * - `moderator` registers pickup points
 *
 * Tokens carry the role directly; a token issued by `/dummyLogin` has no
 * user behind it and an empty subject.
 */

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::entities::user::UserRole;

pub mod password;

pub use password::{hash_password, verify_password};

/// Claim structure for JWT tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,    // User id, empty for dummy logins
    pub role: UserRole, // Access role
    pub jti: String,    // Token id
    pub iat: i64,       // Issued at
    pub exp: i64,       // Expiration time
    pub nbf: i64,       // Not valid before
    pub iss: String,    // Issuer
    pub aud: String,    // Audience
}

/// Authenticated caller extracted from the JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Option<Uuid>,
    pub role: UserRole,
    pub token_id: String,
}

impl AuthUser {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.role == role
    }

    pub fn has_any_role(&self, roles: &[UserRole]) -> bool {
        roles.iter().any(|role| self.has_role(*role))
    }
}

impl TryFrom<Claims> for AuthUser {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = if claims.sub.is_empty() {
            None
        } else {
            Some(Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?)
        };

        Ok(AuthUser {
            user_id,
            role: claims.role,
            token_id: claims.jti,
        })
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub jwt_issuer: String,
    pub access_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_audience: String,
        jwt_issuer: String,
        access_token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_audience,
            jwt_issuer,
            access_token_expiration,
        }
    }
}

impl From<&AppConfig> for AuthConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self::new(
            cfg.jwt_secret.clone(),
            cfg.auth_audience.clone(),
            cfg.auth_issuer.clone(),
            Duration::from_secs(cfg.jwt_expiration as u64),
        )
    }
}

/// Issues and validates access tokens
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Signs an access token for the role, optionally bound to a user.
    pub fn generate_token(&self, user_id: Option<Uuid>, role: UserRole) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.access_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;

        let claims = Claims {
            sub: user_id.map(|id| id.to_string()).unwrap_or_default(),
            role,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Validate a JWT token and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);
        validation.set_audience(&[self.config.jwt_audience.as_str()]);
        validation.validate_nbf = true;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
    }
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, error_message): (StatusCode, &str, String) = match &self {
            Self::MissingAuth => (
                StatusCode::UNAUTHORIZED,
                "AUTH_MISSING",
                "Authentication required".to_string(),
            ),
            Self::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_TOKEN",
                "Invalid authentication token".to_string(),
            ),
            Self::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "AUTH_TOKEN_EXPIRED",
                "Token has expired".to_string(),
            ),
            Self::TokenCreation(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_TOKEN_CREATION_FAILED",
                "Token creation failed".to_string(),
            ),
            Self::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                "AUTH_INSUFFICIENT_PERMISSIONS",
                "Insufficient permissions".to_string(),
            ),
            Self::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_INTERNAL_ERROR",
                "Internal authentication error".to_string(),
            ),
        };

        let body = Json(serde_json::json!({
            "error": {
                "code": error_code,
                "message": error_message,
            }
        }));

        (status, body).into_response()
    }
}

/// Role middleware; admits callers holding any of the listed roles
pub async fn role_middleware(
    State(allowed): State<Arc<[UserRole]>>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AuthError::MissingAuth)?;

    if !user.has_any_role(&allowed) {
        debug!(role = %user.role, "role not permitted for route");
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Authentication middleware that extracts and validates bearer tokens
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return AuthError::InternalError("Authentication service not available".to_string())
                .into_response();
        }
    };

    match extract_auth_from_headers(request.headers(), &auth_service) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingAuth)?;

    let claims = auth_service.validate_token(token)?;
    AuthUser::try_from(claims)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_roles(self, roles: &[UserRole]) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_roles(self, roles: &[UserRole]) -> Self {
        let allowed: Arc<[UserRole]> = Arc::from(roles);
        self.layer(axum::middleware::from_fn_with_state(allowed, role_middleware))
            .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Extension, Router};
    use tower::ServiceExt;

    const SECRET: &str = "unit_test_signing_key_0123456789_abcdef";

    fn service_with_ttl(ttl: Duration) -> AuthService {
        AuthService::new(AuthConfig::new(
            SECRET.to_string(),
            "pvz-service".to_string(),
            "pvz-auth".to_string(),
            ttl,
        ))
    }

    fn service() -> AuthService {
        service_with_ttl(Duration::from_secs(3600))
    }

    #[test]
    fn token_round_trips_role_and_subject() {
        let auth = service();
        let user_id = Uuid::new_v4();
        let token = auth.generate_token(Some(user_id), UserRole::Moderator).unwrap();

        let claims = auth.validate_token(&token).unwrap();
        assert_eq!(claims.role, UserRole::Moderator);
        assert_eq!(claims.sub, user_id.to_string());

        let user = AuthUser::try_from(claims).unwrap();
        assert_eq!(user.user_id, Some(user_id));
    }

    #[test]
    fn dummy_token_has_no_user() {
        let auth = service();
        let token = auth.generate_token(None, UserRole::Employee).unwrap();
        let user = AuthUser::try_from(auth.validate_token(&token).unwrap()).unwrap();
        assert_eq!(user.user_id, None);
        assert!(user.has_role(UserRole::Employee));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = service().generate_token(None, UserRole::Employee).unwrap();
        let other = AuthService::new(AuthConfig::new(
            "another_signing_key_for_a_different_env_987".to_string(),
            "pvz-service".to_string(),
            "pvz-auth".to_string(),
            Duration::from_secs(3600),
        ));
        assert!(matches!(
            other.validate_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn token_for_other_audience_is_rejected() {
        let token = service().generate_token(None, UserRole::Employee).unwrap();
        let mut config = service().config;
        config.jwt_audience = "someone-else".to_string();
        assert!(AuthService::new(config).validate_token(&token).is_err());
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let auth = service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: String::new(),
            role: UserRole::Employee,
            jti: Uuid::new_v4().to_string(),
            iat: now - 7200,
            exp: now - 3600,
            nbf: now - 7200,
            iss: "pvz-auth".to_string(),
            aud: "pvz-service".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            auth.validate_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    fn gated_app(roles: &[UserRole]) -> Router {
        Router::new()
            .route("/desk", get(|| async { "ok" }))
            .with_roles(roles)
            .layer(Extension(Arc::new(service())))
    }

    async fn call(app: Router, token: Option<String>) -> StatusCode {
        let mut builder = axum::http::Request::builder().uri("/desk");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        app.oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let status = call(gated_app(&[UserRole::Employee]), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_role_is_forbidden() {
        let token = service().generate_token(None, UserRole::Moderator).unwrap();
        let status = call(gated_app(&[UserRole::Employee]), Some(token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn any_listed_role_is_admitted() {
        let roles = [UserRole::Employee, UserRole::Moderator];
        for role in roles {
            let token = service().generate_token(None, role).unwrap();
            let status = call(gated_app(&roles), Some(token)).await;
            assert_eq!(status, StatusCode::OK);
        }
    }
}
