use crate::{
    entities::reception::{self, ReceptionStatus},
    errors::ServiceError,
    metrics::BUSINESS_METRICS,
    repositories::{OpenReceptionLookup, ReceptionStore},
};
use sea_orm::SqlErr;
use slog::Logger;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Opens and closes receptions while keeping at most one open per pickup point.
#[derive(Clone)]
pub struct ReceptionService {
    lookup: Arc<dyn OpenReceptionLookup>,
    store: Arc<dyn ReceptionStore>,
    logger: Logger,
}

impl ReceptionService {
    pub fn new(
        lookup: Arc<dyn OpenReceptionLookup>,
        store: Arc<dyn ReceptionStore>,
        logger: Logger,
    ) -> Self {
        Self {
            lookup,
            store,
            logger: logger.new(slog::o!("component" => "receptions")),
        }
    }

    /// Opens a new reception for the pickup point.
    ///
    /// Fails with [`ServiceError::ReceptionAlreadyOpen`] when one is already
    /// open, either as seen by the pre-check or as reported by the storage
    /// uniqueness constraint when a concurrent request got there first.
    #[instrument(skip(self))]
    pub async fn create_reception(
        &self,
        pickup_point_id: Uuid,
    ) -> Result<reception::Model, ServiceError> {
        let open = self
            .lookup
            .find_open_reception(pickup_point_id)
            .await
            .map_err(|e| {
                ServiceError::storage(
                    format!("find open reception for pickup point {}", pickup_point_id),
                    e,
                )
            })?;

        if let Some(open) = open {
            slog::warn!(self.logger, "Reception already open";
                "pickup_point_id" => %pickup_point_id,
                "reception_id" => %open.id,
            );
            return Err(ServiceError::ReceptionAlreadyOpen(pickup_point_id));
        }

        let created = self
            .store
            .create_reception(pickup_point_id)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    ServiceError::ReceptionAlreadyOpen(pickup_point_id)
                }
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                    ServiceError::PickupPointNotFound(pickup_point_id)
                }
                _ => ServiceError::storage(
                    format!("create reception for pickup point {}", pickup_point_id),
                    e,
                ),
            })?;

        BUSINESS_METRICS.record_reception_created();
        slog::info!(self.logger, "Reception opened";
            "pickup_point_id" => %pickup_point_id,
            "reception_id" => %created.id,
        );

        Ok(created)
    }

    /// Closes the open reception of the pickup point and returns it.
    #[instrument(skip(self))]
    pub async fn close_reception(
        &self,
        pickup_point_id: Uuid,
    ) -> Result<reception::Model, ServiceError> {
        let open = self
            .lookup
            .find_open_reception(pickup_point_id)
            .await
            .map_err(|e| {
                ServiceError::storage(
                    format!("find open reception for pickup point {}", pickup_point_id),
                    e,
                )
            })?
            .ok_or(ServiceError::NoOpenReception(pickup_point_id))?;

        let affected = self
            .store
            .close_open_reception(pickup_point_id)
            .await
            .map_err(|e| {
                ServiceError::storage(
                    format!("close reception {} of pickup point {}", open.id, pickup_point_id),
                    e,
                )
            })?;

        // A concurrent close already sealed it.
        if affected == 0 {
            return Err(ServiceError::NoOpenReception(pickup_point_id));
        }

        BUSINESS_METRICS.record_reception_closed();
        slog::info!(self.logger, "Reception closed";
            "pickup_point_id" => %pickup_point_id,
            "reception_id" => %open.id,
        );

        Ok(reception::Model {
            status: ReceptionStatus::Closed,
            ..open
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::discard_logger;
    use crate::repositories::test_support::memory_db;
    use crate::repositories::{
        MockOpenReceptionLookup, MockReceptionStore, PickupPointRepository, PickupPointStore,
        ReceptionRepository,
    };
    use assert_matches::assert_matches;
    use chrono::Utc;
    use mockall::predicate::eq;
    use sea_orm::{DbErr, RuntimeErr};

    fn open_reception(pickup_point_id: Uuid) -> reception::Model {
        reception::Model {
            id: Uuid::new_v4(),
            pickup_point_id,
            created_at: Utc::now(),
            status: ReceptionStatus::Open,
        }
    }

    fn service(lookup: MockOpenReceptionLookup, store: MockReceptionStore) -> ReceptionService {
        ReceptionService::new(Arc::new(lookup), Arc::new(store), discard_logger())
    }

    #[tokio::test]
    async fn creates_reception_when_none_open() {
        let point = Uuid::new_v4();
        let mut lookup = MockOpenReceptionLookup::new();
        lookup
            .expect_find_open_reception()
            .with(eq(point))
            .returning(|_| Ok(None));
        let mut store = MockReceptionStore::new();
        store
            .expect_create_reception()
            .with(eq(point))
            .times(1)
            .returning(|id| Ok(open_reception(id)));

        let created = service(lookup, store).create_reception(point).await.unwrap();
        assert_eq!(created.pickup_point_id, point);
        assert_eq!(created.status, ReceptionStatus::Open);
    }

    #[tokio::test]
    async fn rejects_second_open_reception_without_writing() {
        let point = Uuid::new_v4();
        let mut lookup = MockOpenReceptionLookup::new();
        lookup
            .expect_find_open_reception()
            .returning(|id| Ok(Some(open_reception(id))));
        let mut store = MockReceptionStore::new();
        store.expect_create_reception().never();

        let err = service(lookup, store)
            .create_reception(point)
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::ReceptionAlreadyOpen(id) if id == point);
    }

    #[tokio::test]
    async fn unique_violation_from_concurrent_create_is_already_open() {
        let db = memory_db().await;
        let point = PickupPointRepository::new(db.clone())
            .create_pickup_point("Moscow".into())
            .await
            .unwrap();
        let repo = ReceptionRepository::new(db);
        let first = repo.create_reception(point.id).await.unwrap();

        // Pre-check misses the row a concurrent request just inserted.
        let mut lookup = MockOpenReceptionLookup::new();
        lookup.expect_find_open_reception().returning(|_| Ok(None));
        let service =
            ReceptionService::new(Arc::new(lookup), Arc::new(repo.clone()), discard_logger());

        let err = service.create_reception(point.id).await.unwrap_err();
        assert_matches!(err, ServiceError::ReceptionAlreadyOpen(id) if id == point.id);

        let still_open = repo.find_open_reception(point.id).await.unwrap().unwrap();
        assert_eq!(still_open.id, first.id);
        assert_eq!(still_open.status, ReceptionStatus::Open);
    }

    #[tokio::test]
    async fn lookup_failure_is_storage_error() {
        let mut lookup = MockOpenReceptionLookup::new();
        lookup
            .expect_find_open_reception()
            .returning(|_| Err(DbErr::Conn(RuntimeErr::Internal("refused".into()))));
        let mut store = MockReceptionStore::new();
        store.expect_create_reception().never();

        let err = service(lookup, store)
            .create_reception(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(err.is_storage());
    }

    #[tokio::test]
    async fn close_without_open_reception_fails() {
        let point = Uuid::new_v4();
        let mut lookup = MockOpenReceptionLookup::new();
        lookup.expect_find_open_reception().returning(|_| Ok(None));
        let mut store = MockReceptionStore::new();
        store.expect_close_open_reception().never();

        let err = service(lookup, store)
            .close_reception(point)
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::NoOpenReception(id) if id == point);
    }

    #[tokio::test]
    async fn close_returns_closed_reception() {
        let point = Uuid::new_v4();
        let open = open_reception(point);
        let open_id = open.id;
        let mut lookup = MockOpenReceptionLookup::new();
        lookup
            .expect_find_open_reception()
            .returning(move |_| Ok(Some(open.clone())));
        let mut store = MockReceptionStore::new();
        store
            .expect_close_open_reception()
            .with(eq(point))
            .times(1)
            .returning(|_| Ok(1));

        let closed = service(lookup, store).close_reception(point).await.unwrap();
        assert_eq!(closed.id, open_id);
        assert_eq!(closed.status, ReceptionStatus::Closed);
    }

    #[tokio::test]
    async fn close_losing_race_reports_no_open_reception() {
        let point = Uuid::new_v4();
        let mut lookup = MockOpenReceptionLookup::new();
        lookup
            .expect_find_open_reception()
            .returning(|id| Ok(Some(open_reception(id))));
        let mut store = MockReceptionStore::new();
        store.expect_close_open_reception().returning(|_| Ok(0));

        let err = service(lookup, store)
            .close_reception(point)
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::NoOpenReception(_));
    }

    #[tokio::test]
    async fn close_write_failure_is_storage_error() {
        let point = Uuid::new_v4();
        let mut lookup = MockOpenReceptionLookup::new();
        lookup
            .expect_find_open_reception()
            .returning(|id| Ok(Some(open_reception(id))));
        let mut store = MockReceptionStore::new();
        store
            .expect_close_open_reception()
            .returning(|_| Err(DbErr::Custom("deadlock".into())));

        let err = service(lookup, store)
            .close_reception(point)
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::Storage { ref context, .. } if context.contains(&point.to_string()));
    }
}
