//! HTTP handlers for the Flood Monitoring Platform

pub mod auth;
pub mod flood;
pub mod health;

pub use auth::*;
pub use flood::*;
pub use health::*;
