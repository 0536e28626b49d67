// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while validating and wiring a pipeline.
//!
//! Every variant is detected synchronously by `PipelineBuilder::build`, before
//! any task is spawned, so a mis-configured pipeline never starts running.

use thiserror::Error;

/// Reasons a pipeline cannot be built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// No input stage was configured.
    #[error("pipeline has no input; call `input` before `build`")]
    MissingInput,

    /// No output stage was configured.
    #[error("pipeline has no output; call `output` before `build`")]
    MissingOutput,

    /// At least one layer is required to connect input and output.
    #[error("pipeline has no layers; add at least one job layer")]
    NoLayers,

    /// A layer was declared with zero workers.
    #[error("layer {layer} ('{job}') must have at least one worker")]
    EmptyLayer { layer: usize, job: String },

    /// Bounded queues need room for at least one record.
    #[error("queue capacity must be at least 1")]
    ZeroQueueCapacity,
}
