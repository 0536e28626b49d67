// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! End-to-end pipeline runs over real queues and stage threads.

use std::collections::BTreeMap;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::builtins::{MemoryInput, MemoryOutput};
use crate::config::{Job, JobRegistry, PipelineConfig};
use crate::engine::{DistributorSpec, InputSpec, OutputSpec, PipelineBuilder};
use crate::errors::{ExecutionError, PipelineError};
use crate::jobs::{directed_graph, inverted_index};
use crate::traits::{Consumer, Distributor, Emitter};

fn identity_job() -> Job {
    Job::new(
        "identity",
        |key: &str, value: &str, emitter: &mut dyn Emitter| {
            emitter.emit(key.to_string(), value.to_string())
        },
        |key: &str, values: Vec<String>, emitter: &mut dyn Emitter| {
            for value in values {
                emitter.emit(key.to_string(), value);
            }
        },
    )
}

fn count_job() -> Job {
    Job::new(
        "count",
        |_: &str, value: &str, emitter: &mut dyn Emitter| {
            emitter.emit(value.to_string(), "1".to_string())
        },
        |key: &str, values: Vec<String>, emitter: &mut dyn Emitter| {
            emitter.emit(key.to_string(), values.len().to_string())
        },
    )
}

/// Records every consumer call in order.
#[derive(Clone, Default)]
struct EventConsumer {
    events: Arc<Mutex<Vec<String>>>,
    fail_on: Option<&'static str>,
}

impl EventConsumer {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl Consumer for EventConsumer {
    fn init(&mut self, param: &str) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(format!("init {param}"));
        Ok(())
    }

    fn handle(&mut self, _param: &str, key: &str, value: &str) -> anyhow::Result<()> {
        if self.fail_on == Some(value) {
            anyhow::bail!("cannot store {value}");
        }
        self.events.lock().unwrap().push(format!("handle {key}={value}"));
        Ok(())
    }

    fn complete(&mut self) -> anyhow::Result<()> {
        self.events.lock().unwrap().push("complete".to_string());
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_inverted_index_groups_keys_by_value() {
    let output = MemoryOutput::new();
    let results = output.records();

    let count = PipelineBuilder::new()
        .input(InputSpec::new("", MemoryInput::new(vec![("1", "cat"), ("2", "cat")])))
        .layer(4, inverted_index::job())
        .output(OutputSpec::new("", output))
        .run()
        .await
        .unwrap();

    assert_eq!(count, 1);
    assert_eq!(results.take(), vec![(String::new(), "cat: 1, 2".to_string())]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_identity_layers_preserve_every_record() {
    let records: Vec<(String, String)> = (0..500).map(|i| (format!("k{i}"), i.to_string())).collect();
    let output = MemoryOutput::new();
    let results = output.records();

    let count = PipelineBuilder::new()
        .input(InputSpec::new("", MemoryInput::new(records.clone())))
        .layer(3, identity_job())
        .layer(5, identity_job())
        .queue_capacity(4)
        .output(OutputSpec::new("", output))
        .run()
        .await
        .unwrap();

    assert_eq!(count, 500);
    let mut received = results.take();
    received.sort();
    let mut expected = records;
    expected.sort();
    assert_eq!(received, expected);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_each_key_meets_a_single_reducer() {
    let words: Vec<(String, String)> = (0..100)
        .map(|i| (i.to_string(), format!("word{}", i % 20)))
        .collect();
    let output = MemoryOutput::new();
    let results = output.records();

    let count = PipelineBuilder::new()
        .input(InputSpec::new("", MemoryInput::new(words)))
        .layer(4, count_job())
        .output(OutputSpec::new("", output))
        .run()
        .await
        .unwrap();

    assert_eq!(count, 20);
    let counts: BTreeMap<String, String> = results.take().into_iter().collect();
    assert_eq!(counts.len(), 20);
    assert!(counts.values().all(|n| n == "5"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_empty_input_still_runs_consumer_lifecycle() {
    let consumer = EventConsumer::default();

    let count = PipelineBuilder::new()
        .input(InputSpec::new("", MemoryInput::new(Vec::<(String, String)>::new())))
        .layer(3, identity_job())
        .output(OutputSpec::new("results", consumer.clone()))
        .run()
        .await
        .unwrap();

    assert_eq!(count, 0);
    assert_eq!(consumer.events(), vec!["init results", "complete"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_complete_follows_last_handle() {
    let consumer = EventConsumer::default();
    let input = MemoryInput::new((0..50).map(|i| (i.to_string(), format!("v{i}"))).collect());

    let count = PipelineBuilder::new()
        .input(InputSpec::new("", input))
        .layer(2, identity_job())
        .output(OutputSpec::new("out", consumer.clone()))
        .run()
        .await
        .unwrap();

    let events = consumer.events();
    assert_eq!(count, 50);
    assert_eq!(events.len(), 52);
    assert_eq!(events.first().map(String::as_str), Some("init out"));
    assert_eq!(events.last().map(String::as_str), Some("complete"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failing_generator_truncates_stream() {
    let generator = |_: &str, emitter: &mut dyn Emitter| -> anyhow::Result<()> {
        for i in 0..3 {
            emitter.emit(i.to_string(), i.to_string());
        }
        anyhow::bail!("source went away")
    };

    let count = PipelineBuilder::new()
        .input(InputSpec::new("", generator))
        .layer(2, identity_job())
        .output(OutputSpec::new("", MemoryOutput::new()))
        .run()
        .await
        .unwrap();

    assert_eq!(count, 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_panicking_map_fails_the_run() {
    let job = Job::new(
        "fragile",
        |key: &str, value: &str, emitter: &mut dyn Emitter| {
            if value == "boom" {
                panic!("map exploded on {key}");
            }
            emitter.emit(key.to_string(), value.to_string());
        },
        |key: &str, values: Vec<String>, emitter: &mut dyn Emitter| {
            for value in values {
                emitter.emit(key.to_string(), value);
            }
        },
    );
    let input = MemoryInput::new(vec![("1", "ok"), ("2", "boom"), ("3", "ok")]);

    let err = PipelineBuilder::new()
        .input(InputSpec::new("", input))
        .layer(2, job)
        .output(OutputSpec::new("", MemoryOutput::new()))
        .run()
        .await
        .unwrap_err();

    match err {
        PipelineError::Execution(ExecutionError::StagePanicked { stage, message }) => {
            assert!(stage.starts_with("map[0]."), "unexpected stage {stage}");
            assert_eq!(message, "map exploded on 2");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_consumer_failure_fails_the_run() {
    let consumer = EventConsumer {
        fail_on: Some("poison"),
        ..EventConsumer::default()
    };
    let input = MemoryInput::new((0..200).map(|i| {
        let value = if i == 7 { "poison".to_string() } else { format!("v{i}") };
        (i.to_string(), value)
    }).collect());

    let err = PipelineBuilder::new()
        .input(InputSpec::new("", input))
        .layer(2, identity_job())
        .queue_capacity(2)
        .output(OutputSpec::new("", consumer.clone()))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Execution(ExecutionError::Consumer { phase: "handle", .. })
    ));
    assert!(!consumer.events().contains(&"complete".to_string()));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_directed_graph_finds_each_cycle_once() {
    let lines = vec![("g:0", "a:b"), ("g:1", "b:c"), ("g:2", "c:a,d"), ("g:3", "d:e")];
    let output = MemoryOutput::new();
    let results = output.records();

    let count = PipelineBuilder::new()
        .input(InputSpec::new("", MemoryInput::new(lines)))
        .layer(3, directed_graph::first_pass())
        .layer(3, directed_graph::second_pass())
        .output(OutputSpec::new("", output))
        .run()
        .await
        .unwrap();

    assert_eq!(count, 1);
    assert_eq!(results.take(), vec![(String::new(), "a,b,c".to_string())]);
}

struct CountingDistributor {
    routed: Arc<AtomicUsize>,
}

impl Distributor for CountingDistributor {
    fn route(&mut self, _key: &str, _fan_out: usize) -> usize {
        self.routed.fetch_add(1, Ordering::SeqCst);
        0
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_custom_distributor_routes_map_output() {
    let routed = Arc::new(AtomicUsize::new(0));
    let factory_routed = Arc::clone(&routed);
    let job = count_job().with_map_distributor(DistributorSpec::custom(move |_fan_out| {
        Box::new(CountingDistributor {
            routed: Arc::clone(&factory_routed),
        }) as Box<dyn Distributor>
    }));
    let words: Vec<(String, String)> = (0..30).map(|i| (i.to_string(), format!("w{}", i % 3))).collect();
    let output = MemoryOutput::new();
    let results = output.records();

    let count = PipelineBuilder::new()
        .input(InputSpec::new("", MemoryInput::new(words)))
        .layer(4, job)
        .output(OutputSpec::new("", output))
        .run()
        .await
        .unwrap();

    assert_eq!(count, 3);
    assert_eq!(routed.load(Ordering::SeqCst), 30);
    let counts: BTreeMap<String, String> = results.take().into_iter().collect();
    assert!(counts.values().all(|n| n == "10"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_config_driven_file_pipeline() {
    let dir = tempfile::TempDir::new().unwrap();
    let input_dir = dir.path().join("input");
    fs::create_dir(&input_dir).unwrap();
    fs::write(input_dir.join("a.txt"), "cat\ndog\n").unwrap();
    fs::write(input_dir.join("b.txt"), "cat\n").unwrap();

    let yaml = r#"
input:
  type: file
  path: input
layers:
  - job: inverted_index
    workers: 2
output:
  type: file
  path: output.txt
"#;
    let config = PipelineConfig::from_yaml_str(yaml).unwrap();
    let pipeline = config
        .build(&JobRegistry::with_builtin_jobs(), dir.path())
        .unwrap();

    let count = pipeline.start().await.unwrap();

    assert_eq!(count, 2);
    let written = fs::read_to_string(dir.path().join("output.txt")).unwrap();
    let mut lines: Vec<&str> = written.lines().collect();
    lines.sort();
    assert_eq!(lines, vec!["cat: a.txt:0, b.txt:0", "dog: a.txt:1"]);
}

fn small_pool_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .max_blocking_threads(1)
        .enable_all()
        .build()
        .unwrap()
}

#[test]
fn test_pipeline_runs_on_runtime_with_tiny_blocking_pool() {
    let records: Vec<(String, String)> = (0..1000).map(|i| (i.to_string(), format!("v{i}"))).collect();

    let outcome = small_pool_runtime().block_on(async {
        let run = PipelineBuilder::new()
            .input(InputSpec::new("", MemoryInput::new(records)))
            .layer(2, identity_job())
            .layer(3, identity_job())
            .queue_capacity(1)
            .output(OutputSpec::new("", MemoryOutput::new()))
            .run();
        tokio::time::timeout(Duration::from_secs(30), run).await
    });

    assert_eq!(outcome.expect("pipeline stalled").unwrap(), 1000);
}

#[test]
fn test_failures_are_collected_on_runtime_with_tiny_blocking_pool() {
    let consumer = EventConsumer {
        fail_on: Some("v3"),
        ..EventConsumer::default()
    };
    let records: Vec<(String, String)> = (0..100).map(|i| (i.to_string(), format!("v{i}"))).collect();

    let outcome = small_pool_runtime().block_on(async {
        let run = PipelineBuilder::new()
            .input(InputSpec::new("", MemoryInput::new(records)))
            .layer(4, identity_job())
            .queue_capacity(1)
            .output(OutputSpec::new("", consumer))
            .run();
        tokio::time::timeout(Duration::from_secs(30), run).await
    });

    assert!(matches!(
        outcome.expect("pipeline stalled"),
        Err(PipelineError::Execution(ExecutionError::Consumer { phase: "handle", .. }))
    ));
}
