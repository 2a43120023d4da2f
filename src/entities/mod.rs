pub mod pickup_point;
pub mod product;
pub mod reception;
pub mod user;
