// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Map and reduce workers.
//!
//! A worker reads from one private inbound queue fed by `upstream` producers
//! and writes into every queue of the next layer through its own distributor.
//! Both variants follow the same state machine:
//!
//! ```text
//! Running --(last end-of-stream marker)--> Draining --(markers broadcast)--> Done
//! ```
//!
//! A map worker calls the user function as each record arrives. A reduce
//! worker only buffers while `Running`; the user function runs per key during
//! `Draining`, once every producer has finished.

use std::collections::BTreeMap;
use std::fmt;

use crate::config::job::{MapFn, ReduceFn};
use crate::engine::queue::{broadcast_end, QueueClosed, QueueReceiver, QueueSender};
use crate::errors::ExecutionError;
use crate::observability::messages::stage::{
    GroupsMaterialized, StageFinished, StageStarted, StageStateChanged,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Distributor, Emitter, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerKind {
    Map,
    Reduce,
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerKind::Map => write!(f, "map"),
            WorkerKind::Reduce => write!(f, "reduce"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Running,
    Draining,
    Done,
}

impl WorkerState {
    /// The state that follows this one, or `None` once `Done`.
    pub fn next(self) -> Option<WorkerState> {
        match self {
            WorkerState::Running => Some(WorkerState::Draining),
            WorkerState::Draining => Some(WorkerState::Done),
            WorkerState::Done => None,
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerState::Running => write!(f, "running"),
            WorkerState::Draining => write!(f, "draining"),
            WorkerState::Done => write!(f, "done"),
        }
    }
}

/// Move `state` one step forward and log the transition.
fn advance(state: &mut WorkerState, stage: &str) {
    if let Some(next) = state.next() {
        StageStateChanged {
            stage,
            from: *state,
            to: next,
        }
        .log();
        *state = next;
    }
}

/// Emitter that routes through a distributor into a set of queues.
///
/// The first closed queue latches the emitter shut: later emits are dropped
/// and the owning stage reports `QueueClosed` once the user function returns.
pub(crate) struct RoutingEmitter<'a> {
    distributor: &'a mut dyn Distributor,
    endpoints: &'a [QueueSender],
    emitted: usize,
    closed: bool,
}

impl<'a> RoutingEmitter<'a> {
    pub(crate) fn new(distributor: &'a mut dyn Distributor, endpoints: &'a [QueueSender]) -> Self {
        Self {
            distributor,
            endpoints,
            emitted: 0,
            closed: false,
        }
    }

    pub(crate) fn emitted(&self) -> usize {
        self.emitted
    }

    pub(crate) fn check_open(&self, stage: &str) -> Result<(), ExecutionError> {
        if self.closed {
            Err(queue_closed(stage))
        } else {
            Ok(())
        }
    }
}

impl Emitter for RoutingEmitter<'_> {
    fn emit(&mut self, key: String, value: String) {
        if self.closed {
            return;
        }
        match self.distributor.distribute(key, value, self.endpoints) {
            Ok(()) => self.emitted += 1,
            Err(QueueClosed) => self.closed = true,
        }
    }
}

pub(crate) fn queue_closed(stage: &str) -> ExecutionError {
    ExecutionError::QueueClosed {
        stage: stage.to_string(),
    }
}

/// Wiring shared by both worker variants.
pub(crate) struct WorkerPorts {
    pub label: String,
    pub upstream: usize,
    pub inbound: QueueReceiver,
    pub endpoints: Vec<QueueSender>,
    pub distributor: Box<dyn Distributor>,
}

pub(crate) struct MapWorker {
    ports: WorkerPorts,
    map: MapFn,
    state: WorkerState,
}

impl MapWorker {
    pub(crate) fn new(ports: WorkerPorts, map: MapFn) -> Self {
        Self {
            ports,
            map,
            state: WorkerState::Running,
        }
    }
}

impl Stage for MapWorker {
    fn label(&self) -> &str {
        &self.ports.label
    }

    fn run(mut self: Box<Self>) -> Result<(), ExecutionError> {
        let WorkerPorts {
            label,
            upstream,
            inbound,
            endpoints,
            distributor,
        } = &mut self.ports;

        StageStarted {
            stage: label,
            upstream: *upstream,
            downstream: endpoints.len(),
            distributor: distributor.name(),
        }
        .log();

        let map = &self.map;
        let mut emitter = RoutingEmitter::new(distributor.as_mut(), endpoints);
        let received = inbound.drain_until_end(label, *upstream, |key, value| {
            map(&key, &value, &mut emitter);
            emitter.check_open(label)
        })?;
        let emitted = emitter.emitted();

        advance(&mut self.state, label);
        broadcast_end(endpoints).map_err(|_| queue_closed(label))?;
        advance(&mut self.state, label);

        StageFinished {
            stage: label,
            received,
            emitted,
        }
        .log();
        Ok(())
    }
}

pub(crate) struct ReduceWorker {
    ports: WorkerPorts,
    reduce: ReduceFn,
    state: WorkerState,
    groups: BTreeMap<String, Vec<String>>,
}

impl ReduceWorker {
    pub(crate) fn new(ports: WorkerPorts, reduce: ReduceFn) -> Self {
        Self {
            ports,
            reduce,
            state: WorkerState::Running,
            groups: BTreeMap::new(),
        }
    }
}

impl Stage for ReduceWorker {
    fn label(&self) -> &str {
        &self.ports.label
    }

    fn run(mut self: Box<Self>) -> Result<(), ExecutionError> {
        let WorkerPorts {
            label,
            upstream,
            inbound,
            endpoints,
            distributor,
        } = &mut self.ports;

        StageStarted {
            stage: label,
            upstream: *upstream,
            downstream: endpoints.len(),
            distributor: distributor.name(),
        }
        .log();

        let groups = &mut self.groups;
        let received = inbound.drain_until_end(label, *upstream, |key, value| {
            groups.entry(key).or_default().push(value);
            Ok(())
        })?;

        advance(&mut self.state, label);
        GroupsMaterialized {
            stage: label,
            keys: self.groups.len(),
            values: received,
        }
        .log();

        let reduce = &self.reduce;
        let mut emitter = RoutingEmitter::new(distributor.as_mut(), endpoints);
        for (key, values) in std::mem::take(&mut self.groups) {
            reduce(&key, values, &mut emitter);
            emitter.check_open(label)?;
        }
        let emitted = emitter.emitted();

        broadcast_end(endpoints).map_err(|_| queue_closed(label))?;
        advance(&mut self.state, label);

        StageFinished {
            stage: label,
            received,
            emitted,
        }
        .log();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::distributors::{HashDistributor, RoundRobinDistributor};
    use crate::engine::queue::bounded;
    use crate::engine::Record;
    use std::sync::Arc;

    fn ports(upstream: usize, inbound: QueueReceiver, endpoints: Vec<QueueSender>) -> WorkerPorts {
        WorkerPorts {
            label: "test".into(),
            upstream,
            inbound,
            endpoints,
            distributor: Box::new(RoundRobinDistributor::new()),
        }
    }

    fn drain(rx: &mut QueueReceiver) -> Vec<Record> {
        let mut records = Vec::new();
        while let Some(record) = rx.recv() {
            records.push(record);
        }
        records
    }

    #[test]
    fn test_state_machine_runs_forward_once() {
        let mut state = WorkerState::Running;
        let mut visited = vec![state];
        for _ in 0..4 {
            advance(&mut state, "test");
            visited.push(state);
        }

        assert_eq!(
            visited,
            vec![
                WorkerState::Running,
                WorkerState::Draining,
                WorkerState::Done,
                WorkerState::Done,
                WorkerState::Done,
            ]
        );
        assert_eq!(WorkerState::Done.next(), None);
        assert_eq!(WorkerState::Draining.to_string(), "draining");
    }

    #[test]
    fn test_map_worker_waits_for_every_producer() {
        let (in_tx, in_rx) = bounded(16);
        let (out_tx, mut out_rx) = bounded(16);

        in_tx.send(Record::data("1", "cat")).unwrap();
        in_tx.send(Record::EndOfStream).unwrap();
        in_tx.send(Record::data("2", "dog")).unwrap();
        in_tx.send(Record::EndOfStream).unwrap();

        let map: MapFn = Arc::new(|key: &str, value: &str, emitter: &mut dyn Emitter| {
            emitter.emit(value.to_string(), key.to_string());
        });
        let worker = Box::new(MapWorker::new(ports(2, in_rx, vec![out_tx]), map));
        worker.run().unwrap();

        assert_eq!(
            drain(&mut out_rx),
            vec![
                Record::data("cat", "1"),
                Record::data("dog", "2"),
                Record::EndOfStream,
            ]
        );
    }

    #[test]
    fn test_map_worker_broadcasts_marker_to_every_endpoint() {
        let (in_tx, in_rx) = bounded(4);
        let (a_tx, mut a_rx) = bounded(4);
        let (b_tx, mut b_rx) = bounded(4);
        let (c_tx, mut c_rx) = bounded(4);
        in_tx.send(Record::EndOfStream).unwrap();

        let map: MapFn = Arc::new(|_: &str, _: &str, _: &mut dyn Emitter| {});
        Box::new(MapWorker::new(ports(1, in_rx, vec![a_tx, b_tx, c_tx]), map))
            .run()
            .unwrap();

        for rx in [&mut a_rx, &mut b_rx, &mut c_rx] {
            assert_eq!(drain(rx), vec![Record::EndOfStream]);
        }
    }

    #[test]
    fn test_reduce_worker_groups_before_reducing() {
        let (in_tx, in_rx) = bounded(16);
        let (out_tx, mut out_rx) = bounded(16);

        for (key, value) in [("b", "1"), ("a", "2"), ("b", "3")] {
            in_tx.send(Record::data(key, value)).unwrap();
        }
        in_tx.send(Record::EndOfStream).unwrap();
        in_tx.send(Record::data("a", "4")).unwrap();
        in_tx.send(Record::EndOfStream).unwrap();

        let reduce: ReduceFn = Arc::new(|key: &str, values: Vec<String>, emitter: &mut dyn Emitter| {
            emitter.emit(key.to_string(), values.join("+"));
        });
        Box::new(ReduceWorker::new(ports(2, in_rx, vec![out_tx]), reduce))
            .run()
            .unwrap();

        assert_eq!(
            drain(&mut out_rx),
            vec![
                Record::data("a", "2+4"),
                Record::data("b", "1+3"),
                Record::EndOfStream,
            ]
        );
    }

    #[test]
    fn test_reduce_worker_reports_closed_downstream() {
        let (in_tx, in_rx) = bounded(4);
        let (out_tx, out_rx) = bounded(4);
        drop(out_rx);
        in_tx.send(Record::data("k", "v")).unwrap();
        in_tx.send(Record::EndOfStream).unwrap();

        let reduce: ReduceFn = Arc::new(|key: &str, _values: Vec<String>, emitter: &mut dyn Emitter| {
            emitter.emit(key.to_string(), String::new());
        });
        let mut worker_ports = ports(1, in_rx, vec![out_tx]);
        worker_ports.distributor = Box::new(HashDistributor);
        let err = Box::new(ReduceWorker::new(worker_ports, reduce)).run().unwrap_err();

        assert!(matches!(err, ExecutionError::QueueClosed { .. }));
    }
}
