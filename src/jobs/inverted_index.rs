// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Inverted index: for every distinct value, the sorted list of keys it
//! appeared under.

use crate::config::Job;
use crate::traits::Emitter;

pub const NAME: &str = "inverted_index";

pub fn map(key: &str, value: &str, emitter: &mut dyn Emitter) {
    emitter.emit(value.to_string(), key.to_string());
}

/// Emits `("", "<key>: v1, v2, ...")` with the values sorted.
pub fn reduce(key: &str, mut values: Vec<String>, emitter: &mut dyn Emitter) {
    values.sort();
    emitter.emit(String::new(), format!("{key}: {}", values.join(", ")));
}

pub fn job() -> Job {
    Job::new(NAME, map, reduce)
}
