// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors surfaced by a running pipeline.
//!
//! A stage that fails aborts only its own work. Other stages notice through
//! queue disconnection (`QueueClosed`, `UpstreamClosed`), so when a run fails
//! the orchestrator usually collects several errors. Root causes
//! (`StagePanicked`, `Consumer`) are reported ahead of the disconnections they
//! triggered.

use thiserror::Error;

use crate::errors::BuildError;

#[derive(Error, Debug)]
pub enum ExecutionError {
    /// A downstream queue was dropped while this stage still had records to send.
    #[error("stage '{stage}' could not send: downstream queue closed")]
    QueueClosed { stage: String },

    /// Every producer hung up before delivering its end-of-stream marker.
    #[error("stage '{stage}' lost its upstream with {missing} end-of-stream marker(s) outstanding")]
    UpstreamClosed { stage: String, missing: usize },

    /// The result consumer failed during init, handle or complete.
    #[error("consumer failed during {phase}: {source}")]
    Consumer {
        phase: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A user function panicked inside a stage task.
    #[error("stage '{stage}' panicked: {message}")]
    StagePanicked { stage: String, message: String },

    /// The output stage went away without delivering a result count.
    #[error("output stage finished without reporting a result count")]
    OutputIncomplete,

    /// The operating system refused to start a thread for a stage.
    #[error("stage '{stage}' could not be started: {message}")]
    Spawn { stage: String, message: String },

    /// The stage threads could not be joined.
    #[error("stage '{stage}' could not be joined: {message}")]
    Join { stage: String, message: String },
}

impl ExecutionError {
    /// True for errors that are a consequence of another stage failing.
    pub fn is_disconnection(&self) -> bool {
        matches!(
            self,
            ExecutionError::QueueClosed { .. }
                | ExecutionError::UpstreamClosed { .. }
                | ExecutionError::OutputIncomplete
        )
    }
}

/// Either half of `PipelineBuilder::run`.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}
