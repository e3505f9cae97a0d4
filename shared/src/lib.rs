//! Shared types and models for the Flood Monitoring Platform
//!
//! This crate contains types shared between the backend and other
//! components of the system.

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
