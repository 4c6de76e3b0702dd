// workflow/src/core/context.rs

//! Defines the `Handler<TData, Err>` type used for every pipeline hook.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by a handler.
pub type HandlerFuture<Err> = Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>;

/// Type alias for a pipeline step handler.
///
/// A handler receives a clone of the run's `ContextData<TData>` and resolves to
/// `Result<PipelineControl, Err>`. The same shape is used for before/on/after
/// hooks and for compensation hooks (whose control value is ignored).
///
/// Handlers must drop every lock guard taken on the context before the next
/// `.await`.
pub type Handler<TData, Err> = Box<dyn Fn(ContextData<TData>) -> HandlerFuture<Err> + Send + Sync>;
