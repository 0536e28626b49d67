// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Cycles of length three in a directed graph, in two passes.
//!
//! Input lines look like `node:succ1,succ2`. The first pass turns every edge
//! into a `"yes"` marker keyed `start,end` and every length-two path into its
//! midpoint keyed `end,start`. A cycle exists exactly when a key carries both
//! a marker and a midpoint. The second pass reports each cycle once, starting
//! from its smallest node.

use crate::config::Job;
use crate::engine::DistributorSpec;
use crate::traits::Emitter;

pub const FIRST_PASS: &str = "directed_graph_1";
pub const SECOND_PASS: &str = "directed_graph_2";

const EDGE_MARKER: &str = "yes";

/// Emits each edge under both of its endpoints. Lines without a `:` are skipped.
pub fn map_edges(_key: &str, value: &str, emitter: &mut dyn Emitter) {
    let Some((node, successors)) = value.split_once(':') else {
        return;
    };
    let node = node.trim();
    for successor in successors.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let edge = format!("{node},{successor}");
        emitter.emit(node.to_string(), edge.clone());
        emitter.emit(successor.to_string(), edge);
    }
}

pub fn reduce_paths(key: &str, values: Vec<String>, emitter: &mut dyn Emitter) {
    let mut ins = Vec::new();
    let mut outs = Vec::new();

    for edge in values {
        if let Some((start, end)) = edge.split_once(',') {
            if start == key {
                outs.push(end.to_string());
            } else if end == key {
                ins.push(start.to_string());
            }
        }
        emitter.emit(edge, EDGE_MARKER.to_string());
    }

    for start in &ins {
        for end in &outs {
            emitter.emit(format!("{end},{start}"), key.to_string());
        }
    }
}

pub fn map_identity(key: &str, value: &str, emitter: &mut dyn Emitter) {
    emitter.emit(key.to_string(), value.to_string());
}

pub fn reduce_cycles(key: &str, values: Vec<String>, emitter: &mut dyn Emitter) {
    let Some((first, second)) = key.split_once(',') else {
        return;
    };
    if !values.iter().any(|v| v == EDGE_MARKER) {
        return;
    }

    for midpoint in values.iter().filter(|v| v.as_str() != EDGE_MARKER) {
        if midpoint.as_str() < first && midpoint.as_str() < second {
            emitter.emit(String::new(), format!("{midpoint},{first},{second}"));
        }
    }
}

pub fn first_pass() -> Job {
    Job::new(FIRST_PASS, map_edges, reduce_paths).with_reduce_distributor(DistributorSpec::Hash)
}

pub fn second_pass() -> Job {
    Job::new(SECOND_PASS, map_identity, reduce_cycles)
}
