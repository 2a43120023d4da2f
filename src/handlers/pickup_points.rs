use crate::{
    entities::pickup_point,
    errors::ServiceError,
    handlers::{
        common::{effective_limit, parse_optional_date_bound, validate_input},
        products::ProductResponse,
        receptions::ReceptionResponse,
    },
    services::{ListingQuery, PickupPointWithReceptions, ReceptionWithProducts},
    ApiResponse, ApiResult, AppState,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({ "city": "Moscow" }))]
pub struct CreatePickupPointRequest {
    /// City the pickup point is located in
    #[serde(alias = "City")]
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "Moscow")]
    pub city: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PickupPointResponse {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// Assigned by the server at creation
    pub registration_date: DateTime<Utc>,
    #[schema(example = "Moscow")]
    pub city: String,
}

impl From<pickup_point::Model> for PickupPointResponse {
    fn from(model: pickup_point::Model) -> Self {
        Self {
            id: model.id,
            registration_date: model.registration_date,
            city: model.city,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReceptionListItem {
    pub reception: ReceptionResponse,
    pub products: Vec<ProductResponse>,
}

impl From<ReceptionWithProducts> for ReceptionListItem {
    fn from(item: ReceptionWithProducts) -> Self {
        Self {
            reception: item.reception.into(),
            products: item.products.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PickupPointListItem {
    pub pvz: PickupPointResponse,
    pub receptions: Vec<ReceptionListItem>,
}

impl From<PickupPointWithReceptions> for PickupPointListItem {
    fn from(item: PickupPointWithReceptions) -> Self {
        Self {
            pvz: item.pickup_point.into(),
            receptions: item.receptions.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct PickupPointListQuery {
    /// Page size; defaults to 10 and is capped by configuration
    pub limit: Option<u64>,
    /// Number of pickup points to skip
    pub offset: Option<u64>,
    /// Inclusive lower bound on reception creation time
    #[param(example = "2024-03-01 00:00:00")]
    pub start_date: Option<String>,
    /// Inclusive upper bound on reception creation time
    #[param(example = "2024-03-31 23:59:59")]
    pub end_date: Option<String>,
}

#[utoipa::path(
    post,
    path = "/pvz",
    request_body = CreatePickupPointRequest,
    responses(
        (status = 201, description = "Pickup point created", body = ApiResponse<PickupPointResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Moderator role required")
    ),
    security(("bearer_auth" = [])),
    tag = "pvz"
)]
pub async fn create_pickup_point(
    State(state): State<AppState>,
    Json(payload): Json<CreatePickupPointRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PickupPointResponse>>), ServiceError> {
    validate_input(&payload)?;

    let created = state
        .services
        .pickup_points
        .create_pickup_point(payload.city.trim().to_string())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(created.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/pvz",
    params(PickupPointListQuery),
    responses(
        (status = 200, description = "Pickup points with their receptions and products", body = ApiResponse<Vec<PickupPointListItem>>),
        (status = 400, description = "Malformed date bound", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "pvz"
)]
pub async fn list_pickup_points(
    State(state): State<AppState>,
    Query(query): Query<PickupPointListQuery>,
) -> ApiResult<Vec<PickupPointListItem>> {
    let listing = ListingQuery {
        limit: effective_limit(
            query.limit,
            state.config.default_page_size,
            state.config.max_page_size,
        ),
        offset: query.offset.unwrap_or(0),
        start: parse_optional_date_bound("startDate", query.start_date.as_deref())?,
        end: parse_optional_date_bound("endDate", query.end_date.as_deref())?,
    };

    let points = state.services.listing.list_pickup_points(listing).await?;

    Ok(Json(ApiResponse::success(
        points.into_iter().map(Into::into).collect(),
    )))
}
