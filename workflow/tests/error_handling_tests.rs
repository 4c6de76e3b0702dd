// tests/error_handling_tests.rs
mod common;

use common::*;
use serial_test::serial;
use workflow::{ContextData, Pipeline, PipelineControl, WorkflowError};

fn reservation_pipeline() -> Pipeline<ReservationContext, TestError> {
  let mut pipeline = Pipeline::<ReservationContext, TestError>::new(&[
    ("validate", false, None),
    ("reserve_a", false, None),
    ("reserve_b", false, None),
    ("persist", false, None),
  ]);
  pipeline.on_root("validate", create_recording_handler("validate"));
  pipeline.on_root("reserve_a", create_reserving_handler("reserve_a", 2));
  pipeline.compensate_root("reserve_a", create_releasing_handler("reserve_a", 2));
  pipeline.on_root("reserve_b", create_reserving_handler("reserve_b", 3));
  pipeline.compensate_root("reserve_b", create_releasing_handler("reserve_b", 3));
  pipeline.on_root("persist", create_recording_handler("persist"));
  pipeline
}

#[tokio::test]
#[serial]
async fn test_failure_compensates_completed_steps_in_reverse() {
  setup_tracing();
  let pipeline = reservation_pipeline();
  let mut data = ReservationContext::with_stock(10);
  data.fail_at = Some("persist".to_string());
  let ctx = ContextData::new(data);

  let err = pipeline.run(ctx.clone()).await.unwrap_err();

  assert_eq!(err, TestError::Handler("persist failed".to_string()));
  let guard = ctx.read();
  assert_eq!(guard.stock, 10);
  assert!(guard.reserved.is_empty());
  assert_eq!(guard.compensated, vec!["reserve_b", "reserve_a"]);
}

#[tokio::test]
#[serial]
async fn test_failing_step_is_compensated_too() {
  setup_tracing();
  let pipeline = reservation_pipeline();
  // reserve_a takes 2, reserve_b wants 3 but only 2 remain.
  let ctx = ContextData::new(ReservationContext::with_stock(4));

  let err = pipeline.run(ctx.clone()).await.unwrap_err();

  assert_eq!(err, TestError::Handler("only 2 left".to_string()));
  let guard = ctx.read();
  assert_eq!(guard.stock, 4);
  // reserve_b's compensation runs but finds nothing recorded to undo.
  assert_eq!(guard.compensated, vec!["reserve_b", "reserve_a"]);
  assert!(!guard.steps_executed.contains(&"persist".to_string()));
}

#[tokio::test]
#[serial]
async fn test_failure_before_mutation_compensates_nothing() {
  setup_tracing();
  let pipeline = reservation_pipeline();
  let mut data = ReservationContext::with_stock(10);
  data.fail_at = Some("validate".to_string());
  let ctx = ContextData::new(data);

  assert!(pipeline.run(ctx.clone()).await.is_err());
  let guard = ctx.read();
  assert_eq!(guard.stock, 10);
  assert!(guard.compensated.is_empty());
}

#[tokio::test]
#[serial]
async fn test_compensation_error_does_not_mask_original_error() {
  setup_tracing();
  let mut pipeline = Pipeline::<ReservationContext, TestError>::new(&[
    ("reserve", false, None),
    ("persist", false, None),
  ]);
  pipeline.on_root("reserve", create_reserving_handler("reserve", 1));
  pipeline.compensate_root("reserve", |ctx: ContextData<ReservationContext>| {
    Box::pin(async move {
      ctx.write().compensated.push("reserve".to_string());
      Err::<PipelineControl, TestError>(TestError::Handler("restock unavailable".to_string()))
    })
  });
  pipeline.on_root("persist", create_recording_handler("persist"));

  let mut data = ReservationContext::with_stock(3);
  data.fail_at = Some("persist".to_string());
  let ctx = ContextData::new(data);

  let err = pipeline.run(ctx.clone()).await.unwrap_err();
  assert_eq!(err, TestError::Handler("persist failed".to_string()));
  assert_eq!(ctx.read().compensated, vec!["reserve"]);
}

#[tokio::test]
#[serial]
async fn test_pipeline_run_catches_handler_missing() {
  setup_tracing();
  let mut pipeline = Pipeline::<ReservationContext, TestError>::new(&[
    ("reserve", false, None),
    ("missing", false, None),
  ]);
  pipeline.on_root("reserve", create_reserving_handler("reserve", 1));
  pipeline.compensate_root("reserve", create_releasing_handler("reserve", 1));

  let ctx = ContextData::new(ReservationContext::with_stock(1));
  match pipeline.run(ctx.clone()).await {
    Err(TestError::Workflow(s)) => {
      assert!(s.contains("HandlerMissing"));
      assert!(s.contains("missing"));
    }
    other => panic!("Expected TestError::Workflow(HandlerMissing), got {:?}", other),
  }
  assert_eq!(ctx.read().stock, 1);
}

#[tokio::test]
#[serial]
async fn test_pipeline_with_workflow_error_type() {
  setup_tracing();
  let mut pipeline = Pipeline::<ReservationContext, WorkflowError>::new(&[("fail_task", false, None)]);
  pipeline.on_root("fail_task", |_ctx| {
    Box::pin(async move { Err(WorkflowError::from(anyhow::anyhow!("catalog offline"))) })
  });

  match pipeline.run(ContextData::new(ReservationContext::default())).await {
    Err(WorkflowError::HandlerError { source }) => assert_eq!(source.to_string(), "catalog offline"),
    other => panic!("Expected WorkflowError::HandlerError, got {:?}", other),
  }
}
