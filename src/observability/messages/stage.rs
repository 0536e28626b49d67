// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for individual stages: input, map and reduce workers, output.

use crate::engine::WorkerState;
use crate::errors::ExecutionError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Stage task began running.
///
/// # Log Level
/// `debug!` - Stage lifecycle detail
pub struct StageStarted<'a> {
    pub stage: &'a str,
    pub upstream: usize,
    pub downstream: usize,
    pub distributor: &'a str,
}

impl Display for StageStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage {} started: {} upstream, {} downstream via {}",
            self.stage, self.upstream, self.downstream, self.distributor
        )
    }
}

impl StructuredLog for StageStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            stage = self.stage,
            upstream = self.upstream,
            downstream = self.downstream,
            distributor = self.distributor,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "stage",
            span_name = name,
            stage = self.stage,
            upstream = self.upstream,
            downstream = self.downstream,
            distributor = self.distributor,
        )
    }
}

/// One producer's end-of-stream marker arrived.
///
/// # Log Level
/// `trace!` - High-frequency detail
pub struct EndOfStreamReceived<'a> {
    pub stage: &'a str,
    pub remaining: usize,
}

impl Display for EndOfStreamReceived<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage {} received end of stream, {} producer(s) remaining",
            self.stage, self.remaining
        )
    }
}

impl StructuredLog for EndOfStreamReceived<'_> {
    fn log(&self) {
        tracing::trace!(stage = self.stage, remaining = self.remaining, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "end_of_stream",
            span_name = name,
            stage = self.stage,
            remaining = self.remaining,
        )
    }
}

/// Worker moved to the next state of its lifecycle.
///
/// # Log Level
/// `trace!` - Per-worker detail
pub struct StageStateChanged<'a> {
    pub stage: &'a str,
    pub from: WorkerState,
    pub to: WorkerState,
}

impl Display for StageStateChanged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stage {} {} -> {}", self.stage, self.from, self.to)
    }
}

impl StructuredLog for StageStateChanged<'_> {
    fn log(&self) {
        tracing::trace!(
            stage = self.stage,
            from = %self.from,
            to = %self.to,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "stage_state",
            span_name = name,
            stage = self.stage,
            from = %self.from,
            to = %self.to,
        )
    }
}

/// Reduce worker finished buffering and is about to reduce.
///
/// # Log Level
/// `debug!` - Stage lifecycle detail
pub struct GroupsMaterialized<'a> {
    pub stage: &'a str,
    pub keys: usize,
    pub values: usize,
}

impl Display for GroupsMaterialized<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage {} grouped {} values under {} keys",
            self.stage, self.values, self.keys
        )
    }
}

impl StructuredLog for GroupsMaterialized<'_> {
    fn log(&self) {
        tracing::debug!(
            stage = self.stage,
            keys = self.keys,
            values = self.values,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "groups",
            span_name = name,
            stage = self.stage,
            keys = self.keys,
            values = self.values,
        )
    }
}

/// Stage task returned normally.
///
/// # Log Level
/// `debug!` - Stage lifecycle detail
///
/// # Example
/// ```
/// use the_layercake::observability::messages::stage::StageFinished;
///
/// let msg = StageFinished {
///     stage: "map[0].1",
///     received: 10,
///     emitted: 20,
/// };
///
/// assert_eq!(msg.to_string(), "Stage map[0].1 finished: received 10, emitted 20");
/// ```
pub struct StageFinished<'a> {
    pub stage: &'a str,
    pub received: usize,
    pub emitted: usize,
}

impl Display for StageFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage {} finished: received {}, emitted {}",
            self.stage, self.received, self.emitted
        )
    }
}

impl StructuredLog for StageFinished<'_> {
    fn log(&self) {
        tracing::debug!(
            stage = self.stage,
            received = self.received,
            emitted = self.emitted,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "stage_finished",
            span_name = name,
            stage = self.stage,
            received = self.received,
            emitted = self.emitted,
        )
    }
}

/// Stage task ended with an error or panic.
///
/// # Log Level
/// `warn!` for disconnections, `error!` otherwise
pub struct StageFailed<'a> {
    pub stage: &'a str,
    pub error: &'a ExecutionError,
}

impl Display for StageFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stage {} failed: {}", self.stage, self.error)
    }
}

impl StructuredLog for StageFailed<'_> {
    fn log(&self) {
        if self.error.is_disconnection() {
            tracing::warn!(stage = self.stage, error = %self.error, "{}", self);
        } else {
            tracing::error!(stage = self.stage, error = %self.error, "{}", self);
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "stage_failed",
            span_name = name,
            stage = self.stage,
            error = %self.error,
        )
    }
}

/// Generator returned an error; the stream it produced is truncated.
///
/// # Log Level
/// `error!` - Input lost
pub struct GeneratorFailed<'a> {
    pub param: &'a str,
    pub error: &'a anyhow::Error,
}

impl Display for GeneratorFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Input terminated early (param '{}'): {:#}",
            self.param, self.error
        )
    }
}

impl StructuredLog for GeneratorFailed<'_> {
    fn log(&self) {
        tracing::error!(param = self.param, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "generator_failed",
            span_name = name,
            param = self.param,
            error = %self.error,
        )
    }
}

/// Consumer returned an error during one of its phases.
///
/// # Log Level
/// `error!` - Output lost
pub struct ConsumerFailed<'a> {
    pub phase: &'a str,
    pub error: &'a anyhow::Error,
}

impl Display for ConsumerFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Output failed during {}: {:#}", self.phase, self.error)
    }
}

impl StructuredLog for ConsumerFailed<'_> {
    fn log(&self) {
        tracing::error!(phase = self.phase, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "consumer_failed",
            span_name = name,
            phase = self.phase,
            error = %self.error,
        )
    }
}
