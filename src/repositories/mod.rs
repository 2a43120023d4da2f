//! Storage ports and their sea-orm implementations.
//!
//! Each service depends only on the narrow traits below; the concrete
//! repositories in the submodules implement them against a pooled
//! [`DatabaseConnection`]. All ports return raw [`DbErr`] so that services
//! decide how constraint violations map onto domain errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use uuid::Uuid;

use crate::entities::{pickup_point, product, reception, user};

pub mod listing_repository;
pub mod pickup_point_repository;
pub mod product_repository;
pub mod reception_repository;
pub mod user_repository;

pub use listing_repository::ListingRepository;
pub use pickup_point_repository::PickupPointRepository;
pub use product_repository::ProductRepository;
pub use reception_repository::ReceptionRepository;
pub use user_repository::UserRepository;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PickupPointStore: Send + Sync {
    async fn create_pickup_point(&self, city: String) -> Result<pickup_point::Model, DbErr>;
}

/// Resolves the single open reception of a pickup point, if any.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OpenReceptionLookup: Send + Sync {
    async fn find_open_reception(
        &self,
        pickup_point_id: Uuid,
    ) -> Result<Option<reception::Model>, DbErr>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReceptionStore: Send + Sync {
    /// Inserts an open reception. Fails with a unique violation when the
    /// pickup point already has one.
    async fn create_reception(&self, pickup_point_id: Uuid) -> Result<reception::Model, DbErr>;

    /// Closes the open reception of the pickup point; returns rows affected.
    async fn close_open_reception(&self, pickup_point_id: Uuid) -> Result<u64, DbErr>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn create_product(
        &self,
        product_type: String,
        reception_id: Uuid,
    ) -> Result<product::Model, DbErr>;

    /// Id of the most recently added product of the reception.
    async fn find_last_product_id(&self, reception_id: Uuid) -> Result<Option<Uuid>, DbErr>;

    /// Deletes by id; returns rows affected.
    async fn delete_product(&self, product_id: Uuid) -> Result<u64, DbErr>;
}

/// Read side used by the listing aggregation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingReader: Send + Sync {
    async fn list_pickup_points_by_reception_date(
        &self,
        limit: u64,
        offset: u64,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<pickup_point::Model>, DbErr>;

    async fn list_receptions_by_pickup_point(
        &self,
        pickup_point_id: Uuid,
    ) -> Result<Vec<reception::Model>, DbErr>;

    async fn list_products_by_reception(
        &self,
        reception_id: Uuid,
    ) -> Result<Vec<product::Model>, DbErr>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(
        &self,
        email: String,
        password_hash: String,
        role: user::UserRole,
    ) -> Result<user::Model, DbErr>;

    async fn find_by_email(&self, email: String) -> Result<Option<user::Model>, DbErr>;
}
