// storefront/src/lib.rs

//! Storefront REST API: catalog and order stores, the order placement
//! pipeline and the client cart model.

pub mod cart;
pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod seed;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod web;

pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use state::AppState;
