use crate::{
    entities::product,
    errors::ServiceError,
    handlers::common::validate_input,
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "type": "electronics",
    "pvzId": "550e8400-e29b-41d4-a716-446655440000"
}))]
pub struct AddProductRequest {
    /// Free-text product category
    #[serde(rename = "type", alias = "Type")]
    #[validate(length(min = 1, max = 100))]
    pub product_type: String,
    /// Pickup point whose open reception receives the product
    #[serde(alias = "PvzId")]
    pub pvz_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    /// Time the product was added
    pub date_time: DateTime<Utc>,
    #[serde(rename = "type")]
    #[schema(example = "electronics")]
    pub product_type: String,
    pub reception_id: Uuid,
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            date_time: model.created_at,
            product_type: model.product_type,
            reception_id: model.reception_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedProductResponse {
    /// Id of the removed product
    pub product_id: Uuid,
}

#[utoipa::path(
    post,
    path = "/products",
    request_body = AddProductRequest,
    responses(
        (status = 201, description = "Product added to the open reception", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "No open reception", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employee role required")
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn add_product(
    State(state): State<AppState>,
    Json(payload): Json<AddProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductResponse>>), ServiceError> {
    validate_input(&payload)?;

    let created = state
        .services
        .products
        .add_product(payload.pvz_id, payload.product_type.trim().to_string())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(created.into())),
    ))
}

#[utoipa::path(
    delete,
    path = "/pvz/{pvzId}/delete_last_product",
    params(("pvzId" = Uuid, Path, description = "Pickup point id")),
    responses(
        (status = 200, description = "Most recent product removed", body = ApiResponse<DeletedProductResponse>),
        (status = 404, description = "No open reception or no products", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employee role required")
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn delete_last_product(
    State(state): State<AppState>,
    Path(pvz_id): Path<Uuid>,
) -> ApiResult<DeletedProductResponse> {
    let product_id = state.services.products.delete_last_product(pvz_id).await?;
    Ok(Json(ApiResponse::success(DeletedProductResponse {
        product_id,
    })))
}
