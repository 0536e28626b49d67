// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod consts;
pub mod job;
mod loader;
mod registry;

pub use job::{Job, MapFn, ReduceFn};
pub use loader::{load_config, InputConfig, LayerConfig, OutputConfig, PipelineConfig};
pub use registry::JobRegistry;
