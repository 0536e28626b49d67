// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Arc, Mutex, MutexGuard};

use crate::traits::{Consumer, Emitter, Generator};

/// Emits a fixed list of records, ignoring its parameter.
#[derive(Debug, Clone, Default)]
pub struct MemoryInput {
    records: Vec<(String, String)>,
}

impl MemoryInput {
    pub fn new<K, V>(records: Vec<(K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            records: records
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Generator for MemoryInput {
    fn generate(&mut self, _param: &str, emitter: &mut dyn Emitter) -> anyhow::Result<()> {
        for (key, value) in self.records.drain(..) {
            emitter.emit(key, value);
        }
        Ok(())
    }
}

/// Handle onto the records collected by a `MemoryOutput`.
#[derive(Debug, Clone, Default)]
pub struct SharedRecords(Arc<Mutex<Vec<(String, String)>>>);

impl SharedRecords {
    fn lock(&self) -> MutexGuard<'_, Vec<(String, String)>> {
        // A poisoned lock still holds every record pushed before the panic.
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, key: &str, value: &str) {
        self.lock().push((key.to_string(), value.to_string()));
    }

    /// Remove and return everything collected so far, in arrival order.
    pub fn take(&self) -> Vec<(String, String)> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Collects results in memory. Grab `records()` before handing the consumer
/// to a pipeline.
#[derive(Debug, Clone, Default)]
pub struct MemoryOutput {
    records: SharedRecords,
    completed: Arc<Mutex<bool>>,
}

impl MemoryOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> SharedRecords {
        self.records.clone()
    }

    /// True once `complete` has been called.
    pub fn is_complete(&self) -> bool {
        *self.completed.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Consumer for MemoryOutput {
    fn handle(&mut self, _param: &str, key: &str, value: &str) -> anyhow::Result<()> {
        self.records.push(key, value);
        Ok(())
    }

    fn complete(&mut self) -> anyhow::Result<()> {
        *self.completed.lock().unwrap_or_else(|p| p.into_inner()) = true;
        Ok(())
    }
}
