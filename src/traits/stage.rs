// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ExecutionError;

/// One independently running task of a built pipeline: the input, a map or
/// reduce worker, or the output.
pub trait Stage: Send {
    /// Stable label used in logs and errors, e.g. `map[0].3`.
    fn label(&self) -> &str;

    /// Run to completion on the calling thread. Blocks on queue operations.
    fn run(self: Box<Self>) -> Result<(), ExecutionError>;
}
