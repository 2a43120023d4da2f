use crate::{
    entities::user::{self, UserRole},
    errors::ServiceError,
    handlers::common::validate_input,
    ApiResponse, ApiResult, AppState,
};
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({ "role": "employee" }))]
pub struct DummyLoginRequest {
    pub role: UserRole,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "email": "desk@pvz.example",
    "password": "correct-horse-battery",
    "role": "employee"
}))]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    pub role: UserRole,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
}

impl TokenResponse {
    fn bearer(token: String) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            role: model.role,
        }
    }
}

#[utoipa::path(
    post,
    path = "/dummyLogin",
    request_body = DummyLoginRequest,
    responses(
        (status = 200, description = "Token issued for the role", body = ApiResponse<TokenResponse>),
        (status = 400, description = "Unknown role")
    ),
    tag = "auth"
)]
pub async fn dummy_login(
    State(state): State<AppState>,
    Json(payload): Json<DummyLoginRequest>,
) -> ApiResult<TokenResponse> {
    let token = state.services.users.dummy_login(payload.role)?;
    Ok(Json(ApiResponse::success(TokenResponse::bearer(token))))
}

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "E-mail already registered", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ServiceError> {
    validate_input(&payload)?;

    let created = state
        .services
        .users
        .register(
            payload.email.trim().to_lowercase(),
            payload.password,
            payload.role,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(created.into())),
    ))
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = ApiResponse<TokenResponse>),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<TokenResponse> {
    validate_input(&payload)?;

    let token = state
        .services
        .users
        .login(payload.email.trim().to_lowercase(), payload.password)
        .await?;

    Ok(Json(ApiResponse::success(TokenResponse::bearer(token))))
}
