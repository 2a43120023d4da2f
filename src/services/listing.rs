use crate::{
    entities::{pickup_point, product, reception},
    errors::ServiceError,
    repositories::ListingReader,
};
use chrono::{DateTime, Utc};
use slog::Logger;
use std::sync::Arc;
use tracing::instrument;

/// A reception with every product recorded against it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceptionWithProducts {
    pub reception: reception::Model,
    pub products: Vec<product::Model>,
}

/// A pickup point with all of its receptions.
#[derive(Debug, Clone, PartialEq)]
pub struct PickupPointWithReceptions {
    pub pickup_point: pickup_point::Model,
    pub receptions: Vec<ReceptionWithProducts>,
}

/// Page and reception-date window for [`ListingService::list_pickup_points`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ListingQuery {
    pub limit: u64,
    pub offset: u64,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Builds the pickup point -> receptions -> products view.
#[derive(Clone)]
pub struct ListingService {
    reader: Arc<dyn ListingReader>,
    logger: Logger,
}

impl ListingService {
    pub fn new(reader: Arc<dyn ListingReader>, logger: Logger) -> Self {
        Self {
            reader,
            logger: logger.new(slog::o!("component" => "listing")),
        }
    }

    /// Lists pickup points that have at least one reception inside the date
    /// window. The window only selects pickup points: each listed point
    /// carries all of its receptions and products.
    ///
    /// Any failing lookup aborts the whole listing.
    #[instrument(skip(self))]
    pub async fn list_pickup_points(
        &self,
        query: ListingQuery,
    ) -> Result<Vec<PickupPointWithReceptions>, ServiceError> {
        // Storage binds offsets as signed 64-bit; anything larger is past the end.
        if query.limit == 0 || i64::try_from(query.offset).is_err() {
            return Ok(Vec::new());
        }

        let points = self
            .reader
            .list_pickup_points_by_reception_date(
                query.limit,
                query.offset,
                query.start,
                query.end,
            )
            .await
            .map_err(|e| ServiceError::storage("list pickup points by reception date", e))?;

        let mut result = Vec::with_capacity(points.len());
        for pickup_point in points {
            let receptions = self
                .reader
                .list_receptions_by_pickup_point(pickup_point.id)
                .await
                .map_err(|e| {
                    ServiceError::storage(
                        format!("list receptions of pickup point {}", pickup_point.id),
                        e,
                    )
                })?;

            let mut nested = Vec::with_capacity(receptions.len());
            for reception in receptions {
                let products = self
                    .reader
                    .list_products_by_reception(reception.id)
                    .await
                    .map_err(|e| {
                        ServiceError::storage(
                            format!("list products of reception {}", reception.id),
                            e,
                        )
                    })?;
                nested.push(ReceptionWithProducts {
                    reception,
                    products,
                });
            }

            result.push(PickupPointWithReceptions {
                pickup_point,
                receptions: nested,
            });
        }

        slog::debug!(self.logger, "Pickup points listed";
            "count" => result.len(),
            "limit" => query.limit,
            "offset" => query.offset,
        );

        Ok(result)
    }
}
