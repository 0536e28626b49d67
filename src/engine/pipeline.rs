// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pipeline builder and orchestrator.
//!
//! `PipelineBuilder` collects an input, one or more job layers and an output,
//! then `build` validates the shape and wires the queue graph:
//!
//! ```text
//! input ──► map[0].* ──► reduce[1].* ──► map[2].* ──► reduce[3].* ──► output
//!           (1 producer)  (|map[0]|)      (|reduce[1]|) (|map[2]|)     (|reduce[3]|)
//! ```
//!
//! Every job layer expands into a map layer and a reduce layer with the same
//! worker count. Each worker owns one inbound queue and holds a sender for
//! every queue of the next layer. The numbers in parentheses are the upstream
//! producer counts each stage waits on before it finishes.
//!
//! `Pipeline::start` runs every stage on its own OS thread and waits for the
//! output's completion signal. Stages block on their queues for the whole
//! run, so they never borrow threads from the caller's runtime.

use std::thread::{self, JoinHandle};
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::{Instrument, Span};

use crate::config::consts::DEFAULT_QUEUE_CAPACITY;
use crate::config::job::Job;
use crate::engine::input::{InputSpec, InputStage};
use crate::engine::output::{OutputSpec, OutputStage};
use crate::engine::queue::{bounded, QueueReceiver, QueueSender};
use crate::engine::worker::{MapWorker, ReduceWorker, WorkerKind, WorkerPorts};
use crate::errors::{BuildError, ExecutionError, PipelineError};
use crate::observability::messages::engine::{
    PipelineBuilt, PipelineCompleted, PipelineFailed, PipelineStarted,
};
use crate::observability::messages::stage::StageFailed;
use crate::observability::messages::StructuredLog;
use crate::traits::Stage;

/// One job layer as configured by the caller.
struct LayerSpec {
    workers: usize,
    job: Job,
}

/// Shape of a built pipeline, in physical layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSummary {
    pub layers: Vec<(WorkerKind, usize)>,
    pub queue_capacity: usize,
    pub task_count: usize,
}

impl PipelineSummary {
    pub fn worker_count(&self) -> usize {
        self.layers.iter().map(|(_, workers)| workers).sum()
    }
}

/// Collects the pieces of a pipeline. Defaults are resolved in `build`.
///
/// # Example
/// ```no_run
/// use the_layercake::builtins::{MemoryInput, MemoryOutput};
/// use the_layercake::engine::{InputSpec, OutputSpec};
/// use the_layercake::jobs::inverted_index;
/// use the_layercake::PipelineBuilder;
///
/// # async fn demo() -> Result<(), the_layercake::errors::PipelineError> {
/// let output = MemoryOutput::new();
/// let results = output.records();
///
/// let count = PipelineBuilder::new()
///     .input(InputSpec::new("", MemoryInput::new(vec![("1", "cat"), ("2", "cat")])))
///     .layer(4, inverted_index::job())
///     .output(OutputSpec::new("", output))
///     .run()
///     .await?;
///
/// assert_eq!(count, 1);
/// assert_eq!(results.take(), vec![(String::new(), "cat: 1, 2".to_string())]);
/// # Ok(())
/// # }
/// ```
pub struct PipelineBuilder {
    input: Option<InputSpec>,
    layers: Vec<LayerSpec>,
    output: Option<OutputSpec>,
    queue_capacity: usize,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            input: None,
            layers: Vec::new(),
            output: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    pub fn input(mut self, input: InputSpec) -> Self {
        self.input = Some(input);
        self
    }

    /// Append a job layer run by `workers` map workers and `workers` reduce workers.
    pub fn layer(mut self, workers: usize, job: Job) -> Self {
        self.layers.push(LayerSpec { workers, job });
        self
    }

    pub fn output(mut self, output: OutputSpec) -> Self {
        self.output = Some(output);
        self
    }

    /// Capacity of every queue in the pipeline.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Build and start in one go.
    pub async fn run(self) -> Result<usize, PipelineError> {
        let pipeline = self.build()?;
        Ok(pipeline.start().await?)
    }

    /// Validate the configuration and wire every queue and stage.
    pub fn build(self) -> Result<Pipeline, BuildError> {
        let input = self.input.ok_or(BuildError::MissingInput)?;
        let output = self.output.ok_or(BuildError::MissingOutput)?;
        if self.layers.is_empty() {
            return Err(BuildError::NoLayers);
        }
        if self.queue_capacity == 0 {
            return Err(BuildError::ZeroQueueCapacity);
        }
        for (index, layer) in self.layers.iter().enumerate() {
            if layer.workers == 0 {
                return Err(BuildError::EmptyLayer {
                    layer: index,
                    job: layer.job.name().to_string(),
                });
            }
        }

        let physical = expand_layers(&self.layers);
        let task_count = 2 + physical.iter().map(|(_, workers, _)| workers).sum::<usize>();

        // One inbound queue per worker, plus the single queue into the output.
        let mut senders: Vec<Vec<QueueSender>> = Vec::with_capacity(physical.len());
        let mut receivers: Vec<Vec<QueueReceiver>> = Vec::with_capacity(physical.len());
        for (_, workers, _) in &physical {
            let (layer_senders, layer_receivers): (Vec<QueueSender>, Vec<QueueReceiver>) =
                (0..*workers).map(|_| bounded(self.queue_capacity)).unzip();
            senders.push(layer_senders);
            receivers.push(layer_receivers);
        }
        let (output_sender, output_receiver) = bounded(self.queue_capacity);
        let (completion_tx, completion_rx) = oneshot::channel();

        let mut stages: Vec<Box<dyn Stage>> = Vec::with_capacity(task_count);
        stages.push(Box::new(InputStage::new(input, senders[0].clone())));

        for (index, ((kind, _, job), inbound)) in physical.iter().zip(receivers).enumerate() {
            let upstream = if index == 0 { 1 } else { physical[index - 1].1 };
            let endpoints = match senders.get(index + 1) {
                Some(next) => next.clone(),
                None => vec![output_sender.clone()],
            };

            for (worker, inbound) in inbound.into_iter().enumerate() {
                let distributor = match kind {
                    WorkerKind::Map => job.map_distributor(),
                    WorkerKind::Reduce => job.reduce_distributor(),
                };
                let ports = WorkerPorts {
                    label: format!("{kind}[{index}].{worker}"),
                    upstream,
                    inbound,
                    endpoints: endpoints.clone(),
                    distributor: distributor.instantiate(endpoints.len()),
                };
                let stage: Box<dyn Stage> = match kind {
                    WorkerKind::Map => Box::new(MapWorker::new(ports, job.map_fn())),
                    WorkerKind::Reduce => Box::new(ReduceWorker::new(ports, job.reduce_fn())),
                };
                stages.push(stage);
            }
        }

        let last_layer_workers = physical[physical.len() - 1].1;
        stages.push(Box::new(OutputStage::new(
            output,
            last_layer_workers,
            output_receiver,
            completion_tx,
        )));

        let summary = PipelineSummary {
            layers: physical.iter().map(|(kind, workers, _)| (*kind, *workers)).collect(),
            queue_capacity: self.queue_capacity,
            task_count,
        };
        PipelineBuilt {
            layers: summary.layers.len(),
            workers: summary.worker_count(),
            queue_capacity: summary.queue_capacity,
        }
        .log();

        // Only the stages hold senders from here on, so a stage that dies
        // closes its queues instead of leaving peers waiting on the builder.
        Ok(Pipeline {
            stages,
            completion: completion_rx,
            summary,
        })
    }
}

fn expand_layers(layers: &[LayerSpec]) -> Vec<(WorkerKind, usize, &Job)> {
    layers
        .iter()
        .flat_map(|layer| {
            [
                (WorkerKind::Map, layer.workers, &layer.job),
                (WorkerKind::Reduce, layer.workers, &layer.job),
            ]
        })
        .collect()
}

/// A fully wired, not yet started pipeline. Runs once.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    completion: oneshot::Receiver<usize>,
    summary: PipelineSummary,
}

impl Pipeline {
    pub fn summary(&self) -> &PipelineSummary {
        &self.summary
    }

    /// Launch every stage on its own thread and wait for the output to report
    /// how many records it handled.
    pub async fn start(self) -> Result<usize, ExecutionError> {
        let started = PipelineStarted {
            task_count: self.summary.task_count,
        };
        let span = started.span("pipeline");
        span.in_scope(|| started.log());
        self.drive().instrument(span).await
    }

    async fn drive(self) -> Result<usize, ExecutionError> {
        let start_time = Instant::now();
        let Pipeline {
            stages, completion, ..
        } = self;

        let mut handles: Vec<(String, StageHandle)> = Vec::with_capacity(stages.len());
        let mut spawn_failure = None;
        // Stages left unspawned are dropped with the iterator, closing their
        // queues so the ones already running wind down.
        for stage in stages {
            let label = stage.label().to_string();
            let span = Span::current();
            let spawned = thread::Builder::new()
                .name(label.clone())
                .spawn(move || span.in_scope(|| stage.run()));
            match spawned {
                Ok(handle) => handles.push((label, handle)),
                Err(e) => {
                    spawn_failure = Some(ExecutionError::Spawn {
                        stage: label,
                        message: e.to_string(),
                    });
                    break;
                }
            }
        }

        match completion.await {
            Ok(count) => {
                PipelineCompleted {
                    results: count,
                    duration: start_time.elapsed(),
                }
                .log();
                Ok(count)
            }
            Err(_) => {
                let error = collect_failure(handles, spawn_failure).await;
                PipelineFailed { error: &error }.log();
                Err(error)
            }
        }
    }
}

type StageHandle = JoinHandle<Result<(), ExecutionError>>;

/// Join every stage and pick the most telling error. Root causes beat the
/// disconnections they caused; a stage that never started beats both.
async fn collect_failure(
    handles: Vec<(String, StageHandle)>,
    spawn_failure: Option<ExecutionError>,
) -> ExecutionError {
    let joined = tokio::task::spawn_blocking(move || {
        handles
            .into_iter()
            .map(|(stage, handle)| (stage, handle.join()))
            .collect::<Vec<_>>()
    })
    .await;
    let joined = match joined {
        Ok(joined) => joined,
        Err(join_error) => {
            return ExecutionError::Join {
                stage: "pipeline".to_string(),
                message: join_error.to_string(),
            }
        }
    };

    let mut root_cause = spawn_failure;
    let mut disconnections = Vec::new();

    for (stage, outcome) in joined {
        let error = match outcome {
            Ok(Ok(())) => continue,
            Ok(Err(e)) => e,
            Err(payload) => ExecutionError::StagePanicked {
                stage: stage.clone(),
                message: panic_message(payload),
            },
        };
        StageFailed {
            stage: &stage,
            error: &error,
        }
        .log();

        if error.is_disconnection() {
            disconnections.push(error);
        } else if root_cause.is_none() {
            root_cause = Some(error);
        }
    }

    root_cause
        .or_else(|| disconnections.into_iter().next())
        .unwrap_or(ExecutionError::OutputIncomplete)
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
