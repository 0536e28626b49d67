// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod builtins;   // stock generators + consumers
pub mod config;     // pipeline config files + job registry
pub mod engine;     // queues, distributors, stages, pipeline builder
pub mod errors;     // error handling
pub mod jobs;       // catalogue of ready-made jobs
pub mod observability;
pub mod traits;     // collaborator contracts

pub use engine::{Pipeline, PipelineBuilder, Record};
pub use traits::{Consumer, Distributor, Emitter, Generator};
