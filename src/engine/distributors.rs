// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Stock routing strategies.
//!
//! * `RoundRobinDistributor` cycles through the channels in order, optionally
//!   from a random starting offset so that many producers do not all hammer
//!   channel 0 first.
//! * `HashDistributor` routes by a 32-bit FNV-1a hash of the key, so every
//!   record sharing a key lands on the same channel. Map output must be routed
//!   this way for reduce workers to see complete groups.

use rand::Rng;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

use crate::traits::Distributor;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a.
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in bytes {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[derive(Debug, Default)]
pub struct RoundRobinDistributor {
    cursor: usize,
}

impl RoundRobinDistributor {
    /// Start at channel 0.
    pub fn new() -> Self {
        Self { cursor: 0 }
    }

    /// Start at a uniformly random channel in `[0, fan_out)`.
    pub fn with_random_start(fan_out: usize) -> Self {
        let cursor = if fan_out > 0 {
            rand::rng().random_range(0..fan_out)
        } else {
            0
        };
        Self { cursor }
    }
}

impl Distributor for RoundRobinDistributor {
    fn route(&mut self, _key: &str, fan_out: usize) -> usize {
        if self.cursor >= fan_out {
            self.cursor = 0;
        }
        let index = self.cursor;
        self.cursor += 1;
        index
    }

    fn name(&self) -> &'static str {
        "round_robin"
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HashDistributor;

impl Distributor for HashDistributor {
    fn route(&mut self, key: &str, fan_out: usize) -> usize {
        fnv1a_32(key.as_bytes()) as usize % fan_out
    }

    fn name(&self) -> &'static str {
        "hash"
    }
}

/// Builds one distributor for a task, given the number of channels it feeds.
pub type DistributorFactory = Arc<dyn Fn(usize) -> Box<dyn Distributor> + Send + Sync>;

/// Which distributor a stage should use. Resolved into a concrete instance
/// once per task when the pipeline is built.
///
/// Config files can name the stock strategies:
/// ```yaml
/// map_distributor: hash
/// reduce_distributor: random_round_robin
/// ```
#[derive(Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributorSpec {
    RoundRobin,
    RandomRoundRobin,
    Hash,
    #[serde(skip)]
    Custom(DistributorFactory),
}

impl DistributorSpec {
    pub fn custom<F>(factory: F) -> Self
    where
        F: Fn(usize) -> Box<dyn Distributor> + Send + Sync + 'static,
    {
        DistributorSpec::Custom(Arc::new(factory))
    }

    pub fn instantiate(&self, fan_out: usize) -> Box<dyn Distributor> {
        match self {
            DistributorSpec::RoundRobin => Box::new(RoundRobinDistributor::new()),
            DistributorSpec::RandomRoundRobin => {
                Box::new(RoundRobinDistributor::with_random_start(fan_out))
            }
            DistributorSpec::Hash => Box::new(HashDistributor),
            DistributorSpec::Custom(factory) => factory(fan_out),
        }
    }
}

impl fmt::Debug for DistributorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistributorSpec::RoundRobin => write!(f, "RoundRobin"),
            DistributorSpec::RandomRoundRobin => write!(f, "RandomRoundRobin"),
            DistributorSpec::Hash => write!(f, "Hash"),
            DistributorSpec::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}
