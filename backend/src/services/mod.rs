//! Business logic services for the Flood Monitoring Platform

pub mod auth;
pub mod flood;
pub mod model;

pub use auth::AuthService;
pub use flood::FloodService;
pub use model::FloodModel;
