// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use crate::config::Job;
use crate::jobs::{directed_graph, inverted_index};

/// Named jobs available to config files and front ends.
///
/// The registry is an ordinary value: callers build one, register jobs, and
/// pass it by reference to whatever resolves job names. Independent
/// registries never see each other's jobs.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: BTreeMap<String, Job>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with every job in `crate::jobs`.
    pub fn with_builtin_jobs() -> Self {
        let mut registry = Self::new();
        registry.register(inverted_index::job());
        registry.register(directed_graph::first_pass());
        registry.register(directed_graph::second_pass());
        registry
    }

    /// Register a job under its own name. Returns the job it replaced, if any.
    pub fn register(&mut self, job: Job) -> Option<Job> {
        self.jobs.insert(job.name().to_string(), job)
    }

    pub fn get(&self, name: &str) -> Option<&Job> {
        self.jobs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.jobs.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.jobs.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Emitter;

    fn job(name: &str) -> Job {
        Job::new(
            name,
            |_: &str, _: &str, _: &mut dyn Emitter| {},
            |_: &str, _: Vec<String>, _: &mut dyn Emitter| {},
        )
    }

    #[test]
    fn test_builtin_jobs_are_registered() {
        let registry = JobRegistry::with_builtin_jobs();
        assert_eq!(
            registry.names(),
            vec!["directed_graph_1", "directed_graph_2", "inverted_index"]
        );
        assert!(registry.contains("inverted_index"));
    }

    #[test]
    fn test_registries_are_independent() {
        let mut first = JobRegistry::new();
        let second = JobRegistry::new();

        assert!(first.register(job("wordcount")).is_none());
        assert!(first.get("wordcount").is_some());
        assert!(second.get("wordcount").is_none());
        assert!(second.is_empty());
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = JobRegistry::new();
        registry.register(job("a"));
        let replaced = registry.register(job("a"));

        assert_eq!(replaced.map(|j| j.name().to_string()), Some("a".to_string()));
        assert_eq!(registry.len(), 1);
    }
}
