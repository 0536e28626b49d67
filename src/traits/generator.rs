// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::traits::Emitter;

/// Produces the records that enter a pipeline.
///
/// `generate` is called exactly once, from the input task, with the input's
/// configured parameter (a path, for file inputs). It may emit any number of
/// records and then return. Returning an error ends the stream early; records
/// already emitted still flow through the pipeline.
pub trait Generator: Send {
    fn generate(&mut self, param: &str, emitter: &mut dyn Emitter) -> anyhow::Result<()>;
}

impl<F> Generator for F
where
    F: FnMut(&str, &mut dyn Emitter) -> anyhow::Result<()> + Send,
{
    fn generate(&mut self, param: &str, emitter: &mut dyn Emitter) -> anyhow::Result<()> {
        self(param, emitter)
    }
}
