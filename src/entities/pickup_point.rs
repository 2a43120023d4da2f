use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A pickup point (PVZ) where parcels are received and handed out.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pickup_points")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub registration_date: DateTime<Utc>,
    pub city: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reception::Entity")]
    Receptions,
}

impl Related<super::reception::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
