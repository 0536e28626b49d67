// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Unit of data carried by pipeline queues.
///
/// `EndOfStream` is sent once by every producer to every queue it feeds, so a
/// consumer with N producers knows it is finished after N markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Data { key: String, value: String },
    EndOfStream,
}

impl Record {
    pub fn data(key: impl Into<String>, value: impl Into<String>) -> Self {
        Record::Data {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Record::EndOfStream)
    }
}
