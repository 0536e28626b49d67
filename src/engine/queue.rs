// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bounded blocking queues connecting pipeline stages.
//!
//! Queues wrap tokio's bounded `mpsc` channel and are used exclusively from
//! stage threads through `blocking_send` / `blocking_recv`. A full queue
//! suspends the sender, which is the only flow control in the engine: a slow
//! stage throttles everything upstream of it.

use std::fmt;
use tokio::sync::mpsc;

use crate::engine::Record;
use crate::errors::ExecutionError;
use crate::observability::messages::stage::EndOfStreamReceived;
use crate::observability::messages::StructuredLog;

/// The receiving side of a queue was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueClosed;

impl fmt::Display for QueueClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue closed")
    }
}

impl std::error::Error for QueueClosed {}

/// Create a queue holding at most `capacity` records. `capacity` must be non-zero.
pub fn bounded(capacity: usize) -> (QueueSender, QueueReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (QueueSender(tx), QueueReceiver(rx))
}

#[derive(Debug, Clone)]
pub struct QueueSender(mpsc::Sender<Record>);

impl QueueSender {
    /// Enqueue a record, blocking while the queue is full.
    pub fn send(&self, record: Record) -> Result<(), QueueClosed> {
        self.0.blocking_send(record).map_err(|_| QueueClosed)
    }
}

#[derive(Debug)]
pub struct QueueReceiver(mpsc::Receiver<Record>);

impl QueueReceiver {
    /// Dequeue the next record, blocking while the queue is empty.
    /// Returns `None` once every sender is gone and the queue is drained.
    pub fn recv(&mut self) -> Option<Record> {
        self.0.blocking_recv()
    }

    /// Consume records until `producers` end-of-stream markers have arrived,
    /// handing each data record to `on_data`. Returns the number of data
    /// records received.
    ///
    /// Fails with `UpstreamClosed` when all senders disappear before the last
    /// marker, which happens when an upstream stage aborted.
    pub fn drain_until_end<F>(
        &mut self,
        stage: &str,
        producers: usize,
        mut on_data: F,
    ) -> Result<usize, ExecutionError>
    where
        F: FnMut(String, String) -> Result<(), ExecutionError>,
    {
        let mut remaining = producers;
        let mut received = 0;

        while remaining > 0 {
            match self.recv() {
                Some(Record::Data { key, value }) => {
                    received += 1;
                    on_data(key, value)?;
                }
                Some(Record::EndOfStream) => {
                    remaining -= 1;
                    EndOfStreamReceived { stage, remaining }.log();
                }
                None => {
                    return Err(ExecutionError::UpstreamClosed {
                        stage: stage.to_string(),
                        missing: remaining,
                    });
                }
            }
        }

        Ok(received)
    }
}

/// Send one end-of-stream marker to every endpoint.
///
/// Delivery is attempted on all endpoints even if some are closed, so that the
/// live ones can still finish.
pub fn broadcast_end(endpoints: &[QueueSender]) -> Result<(), QueueClosed> {
    let mut result = Ok(());
    for endpoint in endpoints {
        if endpoint.send(Record::EndOfStream).is_err() {
            result = Err(QueueClosed);
        }
    }
    result
}
