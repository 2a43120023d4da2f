use crate::{
    entities::product,
    errors::ServiceError,
    metrics::BUSINESS_METRICS,
    repositories::{OpenReceptionLookup, ProductStore},
};
use sea_orm::DbErr;
use slog::Logger;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Appends products to the open reception of a pickup point and undoes the
/// most recent one.
#[derive(Clone)]
pub struct ProductService {
    lookup: Arc<dyn OpenReceptionLookup>,
    store: Arc<dyn ProductStore>,
    logger: Logger,
}

impl ProductService {
    pub fn new(
        lookup: Arc<dyn OpenReceptionLookup>,
        store: Arc<dyn ProductStore>,
        logger: Logger,
    ) -> Self {
        Self {
            lookup,
            store,
            logger: logger.new(slog::o!("component" => "products")),
        }
    }

    async fn open_reception_id(&self, pickup_point_id: Uuid) -> Result<Uuid, ServiceError> {
        self.lookup
            .find_open_reception(pickup_point_id)
            .await
            .map_err(|e| {
                ServiceError::storage(
                    format!("find open reception for pickup point {}", pickup_point_id),
                    e,
                )
            })?
            .map(|reception| reception.id)
            .ok_or(ServiceError::NoOpenReception(pickup_point_id))
    }

    #[instrument(skip(self))]
    pub async fn add_product(
        &self,
        pickup_point_id: Uuid,
        product_type: String,
    ) -> Result<product::Model, ServiceError> {
        let reception_id = self.open_reception_id(pickup_point_id).await?;

        let created = self
            .store
            .create_product(product_type, reception_id)
            .await
            .map_err(|e| {
                ServiceError::storage(format!("add product to reception {}", reception_id), e)
            })?;

        BUSINESS_METRICS.record_product_added();
        slog::info!(self.logger, "Product added";
            "pickup_point_id" => %pickup_point_id,
            "reception_id" => %reception_id,
            "product_id" => %created.id,
            "product_type" => &created.product_type,
        );

        Ok(created)
    }

    /// Removes the most recently added product of the open reception.
    #[instrument(skip(self))]
    pub async fn delete_last_product(&self, pickup_point_id: Uuid) -> Result<Uuid, ServiceError> {
        let reception_id = self.open_reception_id(pickup_point_id).await?;

        let product_id = self
            .store
            .find_last_product_id(reception_id)
            .await
            .map_err(|e| {
                ServiceError::storage(
                    format!("find last product of reception {}", reception_id),
                    e,
                )
            })?
            .ok_or(ServiceError::NoProductsInReception(reception_id))?;

        let affected = self.store.delete_product(product_id).await.map_err(|e| {
            ServiceError::storage(
                format!("delete product {} of reception {}", product_id, reception_id),
                e,
            )
        })?;

        if affected == 0 {
            slog::warn!(self.logger, "Last product vanished before delete";
                "reception_id" => %reception_id,
                "product_id" => %product_id,
            );
            return Err(ServiceError::storage(
                format!("delete product {} of reception {}", product_id, reception_id),
                DbErr::RecordNotFound(format!("product {}", product_id)),
            ));
        }

        BUSINESS_METRICS.record_product_deleted();
        slog::info!(self.logger, "Last product deleted";
            "pickup_point_id" => %pickup_point_id,
            "reception_id" => %reception_id,
            "product_id" => %product_id,
        );

        Ok(product_id)
    }
}
