use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A parcel recorded against a reception.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub reception_id: Uuid,
    pub product_type: String,
    pub created_at: DateTime<Utc>,
    /// Strictly increasing within a reception; orders products for LIFO removal.
    pub seq: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reception::Entity",
        from = "Column::ReceptionId",
        to = "super::reception::Column::Id"
    )]
    Reception,
}

impl Related<super::reception::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reception.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
