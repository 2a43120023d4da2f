// Pickup point core
pub mod listing;
pub mod pickup_points;
pub mod products;
pub mod receptions;

// Staff accounts
pub mod users;

pub use listing::{ListingQuery, ListingService, PickupPointWithReceptions, ReceptionWithProducts};
pub use pickup_points::PickupPointService;
pub use products::ProductService;
pub use receptions::ReceptionService;
pub use users::UserService;
