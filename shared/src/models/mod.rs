//! Domain models for the Flood Monitoring Platform

mod flood;
mod user;
mod weather;

pub use flood::*;
pub use user::*;
pub use weather::*;
