// src/lib.rs

//! An async, type-safe step pipeline for orchestrating multi-step business
//! operations such as storefront order placement.
//!
//! A pipeline offers:
//!  - Named steps with before/on/after hooks.
//!  - Asynchronous handlers for I/O-bound operations.
//!  - Early stopping (`PipelineControl::Stop`) and optional steps.
//!  - Per-step skip conditions evaluated against the shared context.
//!  - Compensation hooks: when a step fails, the failing step and every
//!    step completed before it are compensated, most recent first.
//!  - A type-keyed registry for running pipelines by their context type.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

// --- Re-exports for the Public API ---

pub use crate::core::context::Handler;
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{WorkflowError, WorkflowResult};

pub use crate::registry::Registry;

/*
    Typical use:
    1. Define the data struct `PlaceOrderCtx` carried through the process.
    2. Create a `Pipeline<PlaceOrderCtx, AppError>` listing its steps.
    3. Attach async handlers with `.on_root()`, `.before_root()`, `.after_root()`,
       and undo logic with `.compensate_root()` on steps that mutate shared state.
    4. Register the pipeline with a `Registry<AppError>`.
    5. Wrap a fresh `PlaceOrderCtx` in `ContextData::new(..)`, call
       `registry.run(ctx.clone()).await`, then read results out of `ctx`.
*/
