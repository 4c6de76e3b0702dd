// tests/common/mod.rs
#![allow(dead_code)]

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::Level;
use workflow::{ContextData, PipelineControl, WorkflowError};

/// Tracks a toy inventory through a pipeline run.
#[derive(Clone, Debug, Default)]
pub struct ReservationContext {
  pub stock: i32,
  pub reserved: Vec<String>,
  pub steps_executed: Vec<String>,
  pub compensated: Vec<String>,
  pub stop_at: Option<String>,
  pub fail_at: Option<String>,
}

impl ReservationContext {
  pub fn with_stock(stock: i32) -> Self {
    Self {
      stock,
      ..Default::default()
    }
  }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Workflow framework error: {0}")]
  Workflow(String), // Debug-formatted WorkflowError, compared as text

  #[error("Test handler failed: {0}")]
  Handler(String),
}

impl From<WorkflowError> for TestError {
  fn from(err: WorkflowError) -> Self {
    TestError::Workflow(format!("{:?}", err))
  }
}

/// Records the step and honours `stop_at` / `fail_at`.
pub fn create_recording_handler(step_name: &'static str) -> workflow::Handler<ReservationContext, TestError> {
  Box::new(move |ctx: ContextData<ReservationContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.steps_executed.push(step_name.to_string());
      if guard.fail_at.as_deref() == Some(step_name) {
        return Err(TestError::Handler(format!("{} failed", step_name)));
      }
      if guard.stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

/// Takes `units` out of stock and records the reservation.
pub fn create_reserving_handler(
  step_name: &'static str,
  units: i32,
) -> workflow::Handler<ReservationContext, TestError> {
  Box::new(move |ctx: ContextData<ReservationContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.steps_executed.push(step_name.to_string());
      if guard.stock < units {
        return Err(TestError::Handler(format!("only {} left", guard.stock)));
      }
      guard.stock -= units;
      guard.reserved.push(step_name.to_string());
      Ok(PipelineControl::Continue)
    })
  })
}

/// Undoes a reservation made by `create_reserving_handler`, if it was made.
pub fn create_releasing_handler(
  step_name: &'static str,
  units: i32,
) -> workflow::Handler<ReservationContext, TestError> {
  Box::new(move |ctx: ContextData<ReservationContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.compensated.push(step_name.to_string());
      if let Some(pos) = guard.reserved.iter().position(|s| s == step_name) {
        guard.reserved.remove(pos);
        guard.stock += units;
      }
      Ok(PipelineControl::Continue)
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub static HANDLER_EXEC_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  HANDLER_EXEC_COUNTER.store(0, Ordering::SeqCst);
}
