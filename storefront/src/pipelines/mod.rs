// storefront/src/pipelines/mod.rs

//! Defines and registers all workflow pipelines used by the storefront.

use crate::errors::AppError;
use workflow::Registry;

pub mod contexts; // Underlying data structs carried through each pipeline
pub mod placement_pipeline;

pub use placement_pipeline::place_order;

/// Registers every pipeline with `registry`. Called once per `AppState`.
pub fn register_all_pipelines(registry: &Registry<AppError>) {
  tracing::info!("Registering workflow pipelines...");
  placement_pipeline::register_placement_pipeline(registry);
  tracing::info!("All application pipelines registered.");
}
