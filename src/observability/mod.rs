// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging for the pipeline engine.
//!
//! Every diagnostic the engine emits is a small message struct with a
//! `Display` implementation and a `StructuredLog` implementation, so log text
//! lives in one place and every event carries machine-readable fields.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - pipeline build, start, completion and failure
//! * `messages::stage` - per-stage lifecycle and collaborator failures
//!
//! # Usage
//!
//! ```rust
//! use the_layercake::observability::messages::stage::StageFinished;
//! use the_layercake::observability::messages::StructuredLog;
//!
//! StageFinished {
//!     stage: "reduce[0].3",
//!     received: 42,
//!     emitted: 7,
//! }
//! .log();
//! ```

pub mod messages;
