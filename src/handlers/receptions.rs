use crate::{
    entities::reception::{self, ReceptionStatus},
    errors::ServiceError,
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

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({ "pvzId": "550e8400-e29b-41d4-a716-446655440000" }))]
pub struct CreateReceptionRequest {
    /// Pickup point to open the reception at
    #[serde(alias = "PvzId")]
    pub pvz_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceptionResponse {
    pub id: Uuid,
    /// Creation time of the reception
    pub date_time: DateTime<Utc>,
    pub pvz_id: Uuid,
    /// `in_progress` while open, `close` once sealed
    pub status: ReceptionStatus,
}

impl From<reception::Model> for ReceptionResponse {
    fn from(model: reception::Model) -> Self {
        Self {
            id: model.id,
            date_time: model.created_at,
            pvz_id: model.pickup_point_id,
            status: model.status,
        }
    }
}

#[utoipa::path(
    post,
    path = "/receptions",
    request_body = CreateReceptionRequest,
    responses(
        (status = 201, description = "Reception opened", body = ApiResponse<ReceptionResponse>),
        (status = 404, description = "Pickup point not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "A reception is already open", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employee role required")
    ),
    security(("bearer_auth" = [])),
    tag = "receptions"
)]
pub async fn create_reception(
    State(state): State<AppState>,
    Json(payload): Json<CreateReceptionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReceptionResponse>>), ServiceError> {
    let created = state
        .services
        .receptions
        .create_reception(payload.pvz_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(created.into())),
    ))
}

#[utoipa::path(
    patch,
    path = "/pvz/{pvzId}/close_last_reception",
    params(("pvzId" = Uuid, Path, description = "Pickup point id")),
    responses(
        (status = 200, description = "Reception closed", body = ApiResponse<ReceptionResponse>),
        (status = 404, description = "No open reception", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employee role required")
    ),
    security(("bearer_auth" = [])),
    tag = "receptions"
)]
pub async fn close_last_reception(
    State(state): State<AppState>,
    Path(pvz_id): Path<Uuid>,
) -> ApiResult<ReceptionResponse> {
    let closed = state.services.receptions.close_reception(pvz_id).await?;
    Ok(Json(ApiResponse::success(closed.into())))
}
