use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::{pickup_point, product, reception};

use super::ListingReader;

/// Read-only queries backing the pickup point listing
#[derive(Debug, Clone)]
pub struct ListingRepository {
    db: Arc<DatabaseConnection>,
}

impl ListingRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ListingReader for ListingRepository {
    /// Pickup points having at least one reception created inside the
    /// bounds, newest registration first.
    async fn list_pickup_points_by_reception_date(
        &self,
        limit: u64,
        offset: u64,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<pickup_point::Model>, DbErr> {
        let mut query = pickup_point::Entity::find()
            .inner_join(reception::Entity)
            .distinct();

        if let Some(start) = start {
            query = query.filter(reception::Column::CreatedAt.gte(start));
        }
        if let Some(end) = end {
            query = query.filter(reception::Column::CreatedAt.lte(end));
        }

        query
            .order_by_desc(pickup_point::Column::RegistrationDate)
            .order_by_asc(pickup_point::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
    }

    async fn list_receptions_by_pickup_point(
        &self,
        pickup_point_id: Uuid,
    ) -> Result<Vec<reception::Model>, DbErr> {
        reception::Entity::find()
            .filter(reception::Column::PickupPointId.eq(pickup_point_id))
            .order_by_asc(reception::Column::CreatedAt)
            .order_by_asc(reception::Column::Id)
            .all(self.db.as_ref())
            .await
    }

    async fn list_products_by_reception(
        &self,
        reception_id: Uuid,
    ) -> Result<Vec<product::Model>, DbErr> {
        product::Entity::find()
            .filter(product::Column::ReceptionId.eq(reception_id))
            .order_by_asc(product::Column::Seq)
            .all(self.db.as_ref())
            .await
    }
}
