// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::builtins::{FileInput, FileOutput, OutputFormat, StdinInput, StdoutOutput};
use crate::config::consts::{DEFAULT_LAYER_WORKERS, DEFAULT_QUEUE_CAPACITY};
use crate::config::JobRegistry;
use crate::engine::{DistributorSpec, InputSpec, OutputSpec, Pipeline, PipelineBuilder};
use crate::errors::ConfigError;

/// Declarative description of a pipeline run.
///
/// Jobs are referenced by name and resolved against a `JobRegistry`; paths are
/// resolved against a base directory supplied at build time.
///
/// # Example
/// ```yaml
/// queue_capacity: 100
/// input:
///   type: file
///   path: input/
/// layers:
///   - job: directed_graph_1
///     workers: 10
///   - job: directed_graph_2
///     workers: 10
///     reduce_distributor: hash
/// output:
///   type: stdout
///   format: json
/// ```
#[derive(Debug, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    pub input: InputConfig,
    pub layers: Vec<LayerConfig>,
    pub output: OutputConfig,
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_layer_workers() -> usize {
    DEFAULT_LAYER_WORKERS
}

/// Where records come from.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputConfig {
    /// A file, or every regular file in a directory.
    File {
        path: String,
        #[serde(default)]
        distributor: Option<DistributorSpec>,
    },
    Stdin {
        #[serde(default)]
        distributor: Option<DistributorSpec>,
    },
}

/// One job layer: a registered job name and its fan-out.
#[derive(Debug, Deserialize)]
pub struct LayerConfig {
    pub job: String,
    #[serde(default = "default_layer_workers")]
    pub workers: usize,
    #[serde(default)]
    pub map_distributor: Option<DistributorSpec>,
    #[serde(default)]
    pub reduce_distributor: Option<DistributorSpec>,
}

/// Where results go.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputConfig {
    File {
        path: String,
    },
    Stdout {
        #[serde(default)]
        format: OutputFormat,
    },
}

impl InputConfig {
    fn to_spec(&self, base_dir: &Path) -> InputSpec {
        let (spec, distributor) = match self {
            InputConfig::File { path, distributor } => (
                InputSpec::new(resolve(base_dir, path), FileInput::new()),
                distributor,
            ),
            InputConfig::Stdin { distributor } => (InputSpec::new("", StdinInput::new()), distributor),
        };
        match distributor {
            Some(distributor) => spec.with_distributor(distributor.clone()),
            None => spec,
        }
    }
}

impl OutputConfig {
    fn to_spec(&self, base_dir: &Path) -> OutputSpec {
        match self {
            OutputConfig::File { path } => OutputSpec::new(resolve(base_dir, path), FileOutput::new()),
            OutputConfig::Stdout { format } => OutputSpec::new("", StdoutOutput::new(*format)),
        }
    }
}

fn resolve(base_dir: &Path, path: &str) -> String {
    base_dir.join(path).to_string_lossy().into_owned()
}

impl PipelineConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve job names and paths into a ready-to-build `PipelineBuilder`.
    pub fn to_builder(
        &self,
        registry: &JobRegistry,
        base_dir: &Path,
    ) -> Result<PipelineBuilder, ConfigError> {
        let mut builder = PipelineBuilder::new()
            .queue_capacity(self.queue_capacity)
            .input(self.input.to_spec(base_dir));

        for (index, layer) in self.layers.iter().enumerate() {
            let mut job = registry
                .get(&layer.job)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownJob {
                    layer: index,
                    name: layer.job.clone(),
                    available: registry.names(),
                })?;
            if let Some(distributor) = &layer.map_distributor {
                job = job.with_map_distributor(distributor.clone());
            }
            if let Some(distributor) = &layer.reduce_distributor {
                job = job.with_reduce_distributor(distributor.clone());
            }
            builder = builder.layer(layer.workers, job);
        }

        Ok(builder.output(self.output.to_spec(base_dir)))
    }

    /// `to_builder` followed by `build`.
    pub fn build(&self, registry: &JobRegistry, base_dir: &Path) -> Result<Pipeline, ConfigError> {
        Ok(self.to_builder(registry, base_dir)?.build()?)
    }
}

/// Load a pipeline config from disk. Files ending in `.toml` are parsed as
/// TOML, anything else as YAML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => PipelineConfig::from_toml_str(&content),
        _ => PipelineConfig::from_yaml_str(&content),
    }
}
