use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, Set};
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::pickup_point::{ActiveModel as PickupPointActiveModel, Model as PickupPointModel};

use super::PickupPointStore;

/// Repository for pickup point rows
#[derive(Debug, Clone)]
pub struct PickupPointRepository {
    db: Arc<DatabaseConnection>,
}

impl PickupPointRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PickupPointStore for PickupPointRepository {
    async fn create_pickup_point(&self, city: String) -> Result<PickupPointModel, DbErr> {
        PickupPointActiveModel {
            id: Set(Uuid::new_v4()),
            registration_date: Set(Utc::now()),
            city: Set(city),
        }
        .insert(self.db.as_ref())
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::pickup_point::Entity as PickupPoint;
    use crate::repositories::test_support::memory_db;
    use sea_orm::EntityTrait;

    #[tokio::test]
    async fn creates_pickup_point_with_server_timestamp() {
        let db = memory_db().await;
        let repo = PickupPointRepository::new(db.clone());

        let before = Utc::now();
        let created = repo.create_pickup_point("Kazan".into()).await.unwrap();

        assert_eq!(created.city, "Kazan");
        assert!(created.registration_date >= before);

        let stored = PickupPoint::find_by_id(created.id)
            .one(db.as_ref())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.city, "Kazan");
    }
}
