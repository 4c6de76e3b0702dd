// workflow/src/pipeline/execution.rs

//! `Pipeline::run()`: executes steps in order and compensates on failure.

use crate::core::context::Handler;
use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::error::WorkflowError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  /// Executes the pipeline against `ctx_data`.
  ///
  /// Each step runs its `before`, `on` and `after` handlers in that order. A
  /// `Stop` from any handler ends the run with `PipelineResult::Stopped`. An
  /// error ends the run with that error after compensating the failing step
  /// and every earlier step that was entered, most recent first. Skipped
  /// steps are never compensated.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      pipeline_context_data_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");
    let mut entered: Vec<&str> = Vec::with_capacity(self.steps.len());

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = span!(
        Level::INFO,
        "pipeline_step_execution",
        step_name = step_name,
        step_index = step_idx,
        optional = step_def.optional
      );

      if let Some(skip_cond_fn) = &step_def.skip_if {
        if skip_cond_fn(ctx_data.clone()) {
          step_span.in_scope(|| event!(Level::INFO, "Step skipped due to 'skip_if' condition."));
          continue;
        }
      }

      if !self.has_run_handlers(step_name) {
        if step_def.optional {
          step_span.in_scope(|| event!(Level::DEBUG, "Optional step has no handlers, skipping."));
          continue;
        }
        step_span.in_scope(|| event!(Level::ERROR, "Non-optional step has no handlers."));
        self.compensate_entered(&entered, &ctx_data).await;
        return Err(Err::from(WorkflowError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      entered.push(step_name);

      let outcome = async {
        for (phase, handlers) in [("before", &self.before), ("on", &self.on), ("after", &self.after)] {
          if let Some(handlers) = handlers.get(step_name) {
            if run_phase(phase, handlers, &ctx_data).await? == PipelineControl::Stop {
              return Ok(PipelineControl::Stop);
            }
          }
        }
        event!(Level::DEBUG, "Step processing finished successfully.");
        Ok::<_, Err>(PipelineControl::Continue)
      }
      .instrument(step_span)
      .await;

      match outcome {
        Ok(PipelineControl::Continue) => {}
        Ok(PipelineControl::Stop) => return Ok(PipelineResult::Stopped),
        Err(e) => {
          self.compensate_entered(&entered, &ctx_data).await;
          return Err(e);
        }
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed successfully.");
    Ok(PipelineResult::Completed)
  }

  async fn compensate_entered(&self, entered: &[&str], ctx_data: &ContextData<TData>) {
    for step_name in entered.iter().rev() {
      let Some(handlers) = self.compensate.get(*step_name) else {
        continue;
      };
      let comp_span = span!(Level::WARN, "pipeline_step_compensation", step_name = *step_name);
      async {
        event!(Level::WARN, "Compensating step.");
        for (handler_idx, handler_fn) in handlers.iter().enumerate() {
          if let Err(e) = handler_fn(ctx_data.clone()).await {
            event!(Level::ERROR, handler_index = handler_idx, error = %e, "Compensation handler failed.");
          }
        }
      }
      .instrument(comp_span)
      .await;
    }
  }
}

async fn run_phase<TData, Err>(
  phase: &'static str,
  handlers: &[Handler<TData, Err>],
  ctx_data: &ContextData<TData>,
) -> Result<PipelineControl, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + Send + Sync + 'static,
{
  for (handler_idx, handler_fn) in handlers.iter().enumerate() {
    let handler_span = span!(Level::DEBUG, "step_handler", phase, handler_index = handler_idx);
    match handler_fn(ctx_data.clone()).instrument(handler_span).await {
      Ok(PipelineControl::Continue) => {}
      Ok(PipelineControl::Stop) => {
        event!(Level::INFO, phase, "Pipeline stopped by a handler.");
        return Ok(PipelineControl::Stop);
      }
      Err(e) => {
        event!(Level::ERROR, phase, error = %e, "Handler failed.");
        return Err(e);
      }
    }
  }
  Ok(PipelineControl::Continue)
}
