use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::reception::{
    ActiveModel as ReceptionActiveModel, Column, Entity as Reception, Model as ReceptionModel,
    ReceptionStatus,
};

use super::{OpenReceptionLookup, ReceptionStore};

/// Repository for reception rows
#[derive(Debug, Clone)]
pub struct ReceptionRepository {
    db: Arc<DatabaseConnection>,
}

impl ReceptionRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OpenReceptionLookup for ReceptionRepository {
    async fn find_open_reception(
        &self,
        pickup_point_id: Uuid,
    ) -> Result<Option<ReceptionModel>, DbErr> {
        Reception::find()
            .filter(Column::PickupPointId.eq(pickup_point_id))
            .filter(Column::Status.eq(ReceptionStatus::Open))
            .one(self.db.as_ref())
            .await
    }
}

#[async_trait]
impl ReceptionStore for ReceptionRepository {
    async fn create_reception(&self, pickup_point_id: Uuid) -> Result<ReceptionModel, DbErr> {
        ReceptionActiveModel {
            id: Set(Uuid::new_v4()),
            pickup_point_id: Set(pickup_point_id),
            created_at: Set(Utc::now()),
            status: Set(ReceptionStatus::Open),
        }
        .insert(self.db.as_ref())
        .await
    }

    async fn close_open_reception(&self, pickup_point_id: Uuid) -> Result<u64, DbErr> {
        let result = Reception::update_many()
            .col_expr(Column::Status, Expr::value(ReceptionStatus::Closed))
            .filter(Column::PickupPointId.eq(pickup_point_id))
            .filter(Column::Status.eq(ReceptionStatus::Open))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }
}
