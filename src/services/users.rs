use crate::{
    auth::{hash_password, verify_password, AuthService},
    entities::user::{self, UserRole},
    errors::ServiceError,
    repositories::UserStore,
};
use sea_orm::SqlErr;
use slog::Logger;
use std::sync::Arc;
use tracing::instrument;

/// Registers staff accounts and issues access tokens
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    auth: Arc<AuthService>,
    logger: Logger,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, auth: Arc<AuthService>, logger: Logger) -> Self {
        Self {
            store,
            auth,
            logger: logger.new(slog::o!("component" => "users")),
        }
    }

    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: String,
        password: String,
        role: UserRole,
    ) -> Result<user::Model, ServiceError> {
        let password_hash =
            hash_password(&password).map_err(|e| ServiceError::HashError(e.to_string()))?;

        let created = self
            .store
            .create_user(email.clone(), password_hash, role)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    ServiceError::Conflict(format!("User with email {} already exists", email))
                }
                _ => ServiceError::storage(format!("create user {}", email), e),
            })?;

        slog::info!(self.logger, "User registered";
            "user_id" => %created.id,
            "role" => created.role.as_str(),
        );

        Ok(created)
    }

    /// Checks credentials and returns a signed access token.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: String, password: String) -> Result<String, ServiceError> {
        let user = self
            .store
            .find_by_email(email.clone())
            .await
            .map_err(|e| ServiceError::storage(format!("find user {}", email), e))?;

        let user = match user {
            Some(user) if verify_password(&password, &user.password_hash) => user,
            _ => {
                slog::warn!(self.logger, "Login rejected"; "email" => &email);
                return Err(ServiceError::InvalidCredentials);
            }
        };

        self.auth
            .generate_token(Some(user.id), user.role)
            .map_err(|e| ServiceError::JwtError(e.to_string()))
    }

    /// Issues a token for a role without a backing account.
    pub fn dummy_login(&self, role: UserRole) -> Result<String, ServiceError> {
        self.auth
            .generate_token(None, role)
            .map_err(|e| ServiceError::JwtError(e.to_string()))
    }
}
