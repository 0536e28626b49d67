// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for structured logging.
//!
//! * `engine` - pipeline lifecycle
//! * `stage` - input, worker and output stage events

pub mod engine;
pub mod stage;

use tracing::Span;

/// A log message that knows its own level and fields.
pub trait StructuredLog {
    /// Emit the message as a `tracing` event at its documented level.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
