// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Ready-made jobs. Each is registered by `JobRegistry::with_builtin_jobs`.

pub mod directed_graph;
pub mod inverted_index;
