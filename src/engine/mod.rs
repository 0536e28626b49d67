// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod distributors;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod queue;
pub mod record;
pub mod worker;
#[cfg(test)]
mod integration_tests;

pub use distributors::{DistributorSpec, HashDistributor, RoundRobinDistributor};
pub use input::InputSpec;
pub use output::OutputSpec;
pub use pipeline::{Pipeline, PipelineBuilder, PipelineSummary};
pub use record::Record;
pub use worker::{WorkerKind, WorkerState};
