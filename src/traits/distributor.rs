// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::queue::{QueueClosed, QueueSender};
use crate::engine::Record;

/// Routing strategy that picks which downstream queue receives a record.
///
/// Every task owns its own distributor instance, so implementations may keep
/// plain mutable state (a cursor, for instance) without synchronization.
pub trait Distributor: Send {
    /// Index of the channel that should receive a record with `key`.
    /// `fan_out` is the number of candidate channels and is never zero.
    fn route(&mut self, key: &str, fan_out: usize) -> usize;

    fn name(&self) -> &'static str;

    /// Route a data record and enqueue it, blocking while the chosen queue is full.
    fn distribute(
        &mut self,
        key: String,
        value: String,
        channels: &[QueueSender],
    ) -> Result<(), QueueClosed> {
        debug_assert!(!channels.is_empty(), "distribute called without channels");
        let index = self.route(&key, channels.len()) % channels.len();
        channels[index].send(Record::Data { key, value })
    }
}
