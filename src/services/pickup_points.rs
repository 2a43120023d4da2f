use crate::{
    entities::pickup_point, errors::ServiceError, metrics::BUSINESS_METRICS,
    repositories::PickupPointStore,
};
use slog::Logger;
use std::sync::Arc;
use tracing::instrument;

/// Registers pickup points
#[derive(Clone)]
pub struct PickupPointService {
    store: Arc<dyn PickupPointStore>,
    logger: Logger,
}

impl PickupPointService {
    pub fn new(store: Arc<dyn PickupPointStore>, logger: Logger) -> Self {
        Self {
            store,
            logger: logger.new(slog::o!("component" => "pickup_points")),
        }
    }

    /// Creates a pickup point; the registration date is assigned by the server.
    #[instrument(skip(self))]
    pub async fn create_pickup_point(
        &self,
        city: String,
    ) -> Result<pickup_point::Model, ServiceError> {
        let created = self
            .store
            .create_pickup_point(city.clone())
            .await
            .map_err(|e| ServiceError::storage(format!("create pickup point in {}", city), e))?;

        BUSINESS_METRICS.record_pickup_point_created();
        slog::info!(self.logger, "Pickup point created";
            "pickup_point_id" => %created.id,
            "city" => &created.city,
        );

        Ok(created)
    }
}
