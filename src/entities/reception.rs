use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An intake batch at a pickup point.
///
/// A pickup point has at most one reception in the `Open` state; the
/// migrator backs this with a partial unique index on `pickup_point_id`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "receptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub pickup_point_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub status: ReceptionStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pickup_point::Entity",
        from = "Column::PickupPointId",
        to = "super::pickup_point::Column::Id"
    )]
    PickupPoint,
    #[sea_orm(has_many = "super::product::Entity")]
    Products,
}

impl Related<super::pickup_point::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PickupPoint.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Reception lifecycle. `Open -> Closed` is the only transition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum ReceptionStatus {
    #[sea_orm(string_value = "in_progress")]
    #[serde(rename = "in_progress")]
    Open,
    #[sea_orm(string_value = "close")]
    #[serde(rename = "close")]
    Closed,
}
