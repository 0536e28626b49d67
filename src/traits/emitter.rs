// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Sink handed to generators, map functions and reduce functions.
///
/// Each call forwards one record to the next stage. Emits are synchronous: when
/// the chosen downstream queue is full the caller blocks until there is room.
pub trait Emitter {
    fn emit(&mut self, key: String, value: String);
}
