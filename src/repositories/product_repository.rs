use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::entities::product::{
    ActiveModel as ProductActiveModel, Column, Entity as Product, Model as ProductModel,
};

use super::ProductStore;

/// Repository for product rows
#[derive(Debug, Clone)]
pub struct ProductRepository {
    db: Arc<DatabaseConnection>,
}

impl ProductRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductStore for ProductRepository {
    async fn create_product(
        &self,
        product_type: String,
        reception_id: Uuid,
    ) -> Result<ProductModel, DbErr> {
        let txn = self.db.begin().await?;

        let last_seq: Option<i64> = Product::find()
            .select_only()
            .column(Column::Seq)
            .filter(Column::ReceptionId.eq(reception_id))
            .order_by_desc(Column::Seq)
            .into_tuple()
            .one(&txn)
            .await?;

        let created = ProductActiveModel {
            id: Set(Uuid::new_v4()),
            reception_id: Set(reception_id),
            product_type: Set(product_type),
            created_at: Set(Utc::now()),
            seq: Set(last_seq.unwrap_or(0) + 1),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(created)
    }

    async fn find_last_product_id(&self, reception_id: Uuid) -> Result<Option<Uuid>, DbErr> {
        Product::find()
            .select_only()
            .column(Column::Id)
            .filter(Column::ReceptionId.eq(reception_id))
            .order_by_desc(Column::Seq)
            .into_tuple()
            .one(self.db.as_ref())
            .await
    }

    async fn delete_product(&self, product_id: Uuid) -> Result<u64, DbErr> {
        let result = Product::delete_by_id(product_id)
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::memory_db;
    use crate::repositories::{
        PickupPointRepository, PickupPointStore, ReceptionRepository, ReceptionStore,
    };

    async fn setup() -> (ProductRepository, Uuid) {
        let db = memory_db().await;
        let point = PickupPointRepository::new(db.clone())
            .create_pickup_point("Moscow".into())
            .await
            .unwrap();
        let reception = ReceptionRepository::new(db.clone())
            .create_reception(point.id)
            .await
            .unwrap();
        (ProductRepository::new(db), reception.id)
    }

    #[tokio::test]
    async fn sequence_numbers_increase_per_reception() {
        let (repo, reception_id) = setup().await;

        let first = repo
            .create_product("electronics".into(), reception_id)
            .await
            .unwrap();
        let second = repo
            .create_product("clothing".into(), reception_id)
            .await
            .unwrap();

        assert_eq!(first.seq, 1);
        assert_eq!(second.seq, 2);
        assert_eq!(
            repo.find_last_product_id(reception_id).await.unwrap(),
            Some(second.id)
        );
    }

    #[tokio::test]
    async fn delete_reports_rows_affected() {
        let (repo, reception_id) = setup().await;
        let product = repo
            .create_product("shoes".into(), reception_id)
            .await
            .unwrap();

        assert_eq!(repo.delete_product(product.id).await.unwrap(), 1);
        assert_eq!(repo.delete_product(product.id).await.unwrap(), 0);
        assert_eq!(repo.find_last_product_id(reception_id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn last_product_follows_sequence_after_deletes() {
        let (repo, reception_id) = setup().await;
        let first = repo
            .create_product("electronics".into(), reception_id)
            .await
            .unwrap();
        let second = repo
            .create_product("clothing".into(), reception_id)
            .await
            .unwrap();

        repo.delete_product(second.id).await.unwrap();
        assert_eq!(
            repo.find_last_product_id(reception_id).await.unwrap(),
            Some(first.id)
        );

        let third = repo
            .create_product("shoes".into(), reception_id)
            .await
            .unwrap();
        assert_eq!(third.seq, 2);
    }
}
