//! HTTP handlers for the bfhl service.

pub mod bfhl;
pub mod health;
pub mod metrics;

pub use bfhl::{bfhl, not_found};
pub use health::health_check;
