// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;

use crate::engine::distributors::DistributorSpec;
use crate::traits::Emitter;

/// User map function: called once per inbound record.
pub type MapFn = Arc<dyn Fn(&str, &str, &mut dyn Emitter) + Send + Sync>;
/// User reduce function: called once per distinct key with every value seen for it.
pub type ReduceFn = Arc<dyn Fn(&str, Vec<String>, &mut dyn Emitter) + Send + Sync>;

/// A map/reduce pair plus optional routing overrides.
///
/// Map output defaults to hash routing so that a key's values meet in a single
/// reduce worker. Reduce output defaults to round-robin.
#[derive(Clone)]
pub struct Job {
    name: String,
    map: MapFn,
    reduce: ReduceFn,
    map_distributor: Option<DistributorSpec>,
    reduce_distributor: Option<DistributorSpec>,
}

impl Job {
    pub fn new<M, R>(name: impl Into<String>, map: M, reduce: R) -> Self
    where
        M: Fn(&str, &str, &mut dyn Emitter) + Send + Sync + 'static,
        R: Fn(&str, Vec<String>, &mut dyn Emitter) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            map: Arc::new(map),
            reduce: Arc::new(reduce),
            map_distributor: None,
            reduce_distributor: None,
        }
    }

    pub fn with_map_distributor(mut self, distributor: DistributorSpec) -> Self {
        self.map_distributor = Some(distributor);
        self
    }

    pub fn with_reduce_distributor(mut self, distributor: DistributorSpec) -> Self {
        self.reduce_distributor = Some(distributor);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn map_fn(&self) -> MapFn {
        Arc::clone(&self.map)
    }

    pub fn reduce_fn(&self) -> ReduceFn {
        Arc::clone(&self.reduce)
    }

    pub fn map_distributor(&self) -> DistributorSpec {
        self.map_distributor.clone().unwrap_or(DistributorSpec::Hash)
    }

    pub fn reduce_distributor(&self) -> DistributorSpec {
        self.reduce_distributor
            .clone()
            .unwrap_or(DistributorSpec::RoundRobin)
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("name", &self.name)
            .field("map_distributor", &self.map_distributor)
            .field("reduce_distributor", &self.reduce_distributor)
            .finish()
    }
}
