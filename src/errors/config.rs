// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

use crate::errors::BuildError;

/// Errors that can occur while loading a pipeline config and resolving it
/// against a job registry.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// A layer references a job name the registry does not know.
    #[error("layer {layer} references unknown job '{name}' (registered: {})", .available.join(", "))]
    UnknownJob {
        layer: usize,
        name: String,
        available: Vec<String>,
    },

    #[error(transparent)]
    Build(#[from] BuildError),
}
