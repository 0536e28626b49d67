// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Receives the final records of a pipeline.
///
/// The output task calls `init` once before any record, `handle` once per
/// record, and `complete` exactly once after the last `handle`. `init` and
/// `complete` default to no-ops so simple consumers only implement `handle`.
pub trait Consumer: Send {
    fn init(&mut self, _param: &str) -> anyhow::Result<()> {
        Ok(())
    }

    fn handle(&mut self, param: &str, key: &str, value: &str) -> anyhow::Result<()>;

    fn complete(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}
