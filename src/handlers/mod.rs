pub mod common;
pub mod pickup_points;
pub mod products;
pub mod receptions;
pub mod users;

use crate::{
    auth::AuthService,
    db::DbPool,
    repositories::{
        ListingRepository, PickupPointRepository, ProductRepository, ReceptionRepository,
        UserRepository,
    },
    services::{ListingService, PickupPointService, ProductService, ReceptionService, UserService},
};
use slog::Logger;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub pickup_points: Arc<PickupPointService>,
    pub receptions: Arc<ReceptionService>,
    pub products: Arc<ProductService>,
    pub listing: Arc<ListingService>,
    pub users: Arc<UserService>,
}

impl AppServices {
    /// Wires every service to its sea-orm repositories, handing each one a
    /// child of `logger`.
    pub fn new(db_pool: Arc<DbPool>, auth_service: Arc<AuthService>, logger: Logger) -> Self {
        let receptions_repo = Arc::new(ReceptionRepository::new(db_pool.clone()));

        let pickup_points = Arc::new(PickupPointService::new(
            Arc::new(PickupPointRepository::new(db_pool.clone())),
            logger.clone(),
        ));
        let receptions = Arc::new(ReceptionService::new(
            receptions_repo.clone(),
            receptions_repo.clone(),
            logger.clone(),
        ));
        let products = Arc::new(ProductService::new(
            receptions_repo,
            Arc::new(ProductRepository::new(db_pool.clone())),
            logger.clone(),
        ));
        let listing = Arc::new(ListingService::new(
            Arc::new(ListingRepository::new(db_pool.clone())),
            logger.clone(),
        ));
        let users = Arc::new(UserService::new(
            Arc::new(UserRepository::new(db_pool)),
            auth_service,
            logger,
        ));

        Self {
            pickup_points,
            receptions,
            products,
            listing,
            users,
        }
    }
}
