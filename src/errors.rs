use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "Conflict",
    "message": "Pickup point 550e8400-e29b-41d4-a716-446655440000 already has an open reception",
    "request_id": "req-abc123xyz",
    "timestamp": "2024-12-09T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Conflict")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Unique request identifier for support and debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// RFC 3339 timestamp when the error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Pickup point {0} already has an open reception")]
    ReceptionAlreadyOpen(Uuid),

    #[error("Pickup point {0} has no open reception")]
    NoOpenReception(Uuid),

    #[error("Reception {0} has no products")]
    NoProductsInReception(Uuid),

    #[error("Pickup point {0} not found")]
    PickupPointNotFound(Uuid),

    #[error("Storage error ({context}): {source}")]
    Storage {
        context: String,
        #[source]
        source: DbErr,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Hash error: {0}")]
    HashError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        ServiceError::storage("database", err)
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Wraps a persistence failure with the identifiers involved.
    pub fn storage(context: impl Into<String>, source: DbErr) -> Self {
        ServiceError::Storage {
            context: context.into(),
            source,
        }
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, ServiceError::Storage { .. })
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ReceptionAlreadyOpen(_) | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NoOpenReception(_)
            | Self::NoProductsInReception(_)
            | Self::PickupPointNotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthorized(_) | Self::JwtError(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Storage { .. } | Self::HashError(_) | Self::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::Storage { .. } => "Database error".to_string(),
            Self::HashError(_) | Self::InternalError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: None,
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn service_error_response_includes_request_id() {
        let pickup_point_id = Uuid::new_v4();
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("req-123"), async {
                ServiceError::NoOpenReception(pickup_point_id).into_response()
            })
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.request_id.as_deref(), Some("req-123"));
        assert!(payload.message.contains(&pickup_point_id.to_string()));
    }

    #[test]
    fn domain_errors_map_to_distinct_statuses() {
        let id = Uuid::new_v4();
        assert_eq!(
            ServiceError::ReceptionAlreadyOpen(id).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::NoOpenReception(id).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::NoProductsInReception(id).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::storage("reception lookup", DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServiceError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn storage_error_keeps_context_but_hides_it_from_clients() {
        let id = Uuid::new_v4();
        let err = ServiceError::storage(
            format!("find open reception for pickup point {}", id),
            DbErr::Custom("connection reset".into()),
        );

        assert!(err.to_string().contains(&id.to_string()));
        assert!(err.to_string().contains("connection reset"));
        assert_eq!(err.response_message(), "Database error");
        assert!(err.is_storage());
    }

    #[test]
    fn plain_db_errors_convert_to_storage() {
        let err: ServiceError = DbErr::Custom("gone".into()).into();
        assert!(err.is_storage());
    }
}
