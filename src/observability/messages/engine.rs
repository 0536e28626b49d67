// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for pipeline lifecycle events.

use crate::errors::ExecutionError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Pipeline wired and validated.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_layercake::observability::messages::engine::PipelineBuilt;
///
/// let msg = PipelineBuilt {
///     layers: 4,
///     workers: 40,
///     queue_capacity: 100,
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Pipeline built: 4 worker layers, 40 workers, queue capacity 100"
/// );
/// ```
pub struct PipelineBuilt {
    pub layers: usize,
    pub workers: usize,
    pub queue_capacity: usize,
}

impl Display for PipelineBuilt {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline built: {} worker layers, {} workers, queue capacity {}",
            self.layers, self.workers, self.queue_capacity
        )
    }
}

impl StructuredLog for PipelineBuilt {
    fn log(&self) {
        tracing::info!(
            layers = self.layers,
            workers = self.workers,
            queue_capacity = self.queue_capacity,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline_built",
            span_name = name,
            layers = self.layers,
            workers = self.workers,
            queue_capacity = self.queue_capacity,
        )
    }
}

/// Pipeline started; every stage is about to be spawned.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PipelineStarted {
    pub task_count: usize,
}

impl Display for PipelineStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Starting pipeline with {} tasks", self.task_count)
    }
}

impl StructuredLog for PipelineStarted {
    fn log(&self) {
        tracing::info!(task_count = self.task_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("pipeline", span_name = name, task_count = self.task_count)
    }
}

/// Output stage reported its result count.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PipelineCompleted {
    pub results: usize,
    pub duration: Duration,
}

impl Display for PipelineCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline completed: {} results in {:?}",
            self.results, self.duration
        )
    }
}

impl StructuredLog for PipelineCompleted {
    fn log(&self) {
        tracing::info!(
            results = self.results,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline_completed",
            span_name = name,
            results = self.results,
            duration = ?self.duration,
        )
    }
}

/// Pipeline ended without a result count.
///
/// # Log Level
/// `error!` - Run failed
pub struct PipelineFailed<'a> {
    pub error: &'a ExecutionError,
}

impl Display for PipelineFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Pipeline failed: {}", self.error)
    }
}

impl StructuredLog for PipelineFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("pipeline_failed", span_name = name, error = %self.error)
    }
}
