// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use tokio::sync::oneshot;

use crate::engine::queue::QueueReceiver;
use crate::errors::ExecutionError;
use crate::observability::messages::stage::{ConsumerFailed, StageFinished, StageStarted};
use crate::observability::messages::StructuredLog;
use crate::traits::{Consumer, Stage};

pub(crate) const OUTPUT_LABEL: &str = "output";

/// Output side of a pipeline: a consumer and the parameter passed to its
/// `init` and `handle` calls.
pub struct OutputSpec {
    pub(crate) param: String,
    pub(crate) consumer: Box<dyn Consumer>,
}

impl OutputSpec {
    pub fn new(param: impl Into<String>, consumer: impl Consumer + 'static) -> Self {
        Self {
            param: param.into(),
            consumer: Box::new(consumer),
        }
    }
}

impl fmt::Debug for OutputSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSpec")
            .field("param", &self.param)
            .finish()
    }
}

pub(crate) struct OutputStage {
    param: String,
    consumer: Box<dyn Consumer>,
    upstream: usize,
    inbound: QueueReceiver,
    completion: oneshot::Sender<usize>,
}

impl OutputStage {
    pub(crate) fn new(
        spec: OutputSpec,
        upstream: usize,
        inbound: QueueReceiver,
        completion: oneshot::Sender<usize>,
    ) -> Self {
        Self {
            param: spec.param,
            consumer: spec.consumer,
            upstream,
            inbound,
            completion,
        }
    }
}

fn consumer_error(phase: &'static str, source: anyhow::Error) -> ExecutionError {
    ConsumerFailed {
        phase,
        error: &source,
    }
    .log();
    ExecutionError::Consumer { phase, source }
}

impl Stage for OutputStage {
    fn label(&self) -> &str {
        OUTPUT_LABEL
    }

    fn run(self: Box<Self>) -> Result<(), ExecutionError> {
        let OutputStage {
            param,
            mut consumer,
            upstream,
            mut inbound,
            completion,
        } = *self;

        StageStarted {
            stage: OUTPUT_LABEL,
            upstream,
            downstream: 0,
            distributor: "none",
        }
        .log();

        consumer
            .init(&param)
            .map_err(|e| consumer_error("init", e))?;

        let mut count = 0;
        inbound.drain_until_end(OUTPUT_LABEL, upstream, |key, value| {
            consumer
                .handle(&param, &key, &value)
                .map_err(|e| consumer_error("handle", e))?;
            count += 1;
            Ok(())
        })?;

        consumer
            .complete()
            .map_err(|e| consumer_error("complete", e))?;

        StageFinished {
            stage: OUTPUT_LABEL,
            received: count,
            emitted: 0,
        }
        .log();

        // The orchestrator may have stopped waiting; the count is then unobserved.
        let _ = completion.send(count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::queue::bounded;
    use crate::engine::Record;

    struct JournalConsumer(std::sync::mpsc::Sender<String>, Option<&'static str>);

    impl Consumer for JournalConsumer {
        fn init(&mut self, param: &str) -> anyhow::Result<()> {
            self.0.send(format!("init {param}"))?;
            Ok(())
        }

        fn handle(&mut self, _param: &str, key: &str, value: &str) -> anyhow::Result<()> {
            if self.1 == Some(key) {
                anyhow::bail!("rejecting {key}");
            }
            self.0.send(format!("handle {key}={value}"))?;
            Ok(())
        }

        fn complete(&mut self) -> anyhow::Result<()> {
            self.0.send("complete".into())?;
            Ok(())
        }
    }

    fn run_output(
        records: Vec<Record>,
        upstream: usize,
        fail_on: Option<&'static str>,
    ) -> (Vec<String>, Result<(), ExecutionError>, Option<usize>) {
        let (tx, rx) = bounded(16);
        for record in records {
            tx.send(record).unwrap();
        }
        let (events_tx, events_rx) = std::sync::mpsc::channel();
        let (done_tx, mut done_rx) = oneshot::channel();

        let stage = OutputStage::new(
            OutputSpec::new("out.txt", JournalConsumer(events_tx, fail_on)),
            upstream,
            rx,
            done_tx,
        );
        let result = Box::new(stage).run();

        let events = events_rx.try_iter().collect();
        (events, result, done_rx.try_recv().ok())
    }

    #[test]
    fn test_output_counts_and_completes_after_last_handle() {
        let (events, result, count) = run_output(
            vec![
                Record::data("a", "1"),
                Record::EndOfStream,
                Record::data("b", "2"),
                Record::EndOfStream,
            ],
            2,
            None,
        );

        result.unwrap();
        assert_eq!(count, Some(2));
        assert_eq!(
            events,
            vec!["init out.txt", "handle a=1", "handle b=2", "complete"]
        );
    }

    #[test]
    fn test_output_with_no_records() {
        let (events, result, count) = run_output(vec![Record::EndOfStream], 1, None);

        result.unwrap();
        assert_eq!(count, Some(0));
        assert_eq!(events, vec!["init out.txt", "complete"]);
    }

    #[test]
    fn test_consumer_failure_drops_completion_signal() {
        let (events, result, count) = run_output(
            vec![Record::data("a", "1"), Record::data("bad", "2"), Record::EndOfStream],
            1,
            Some("bad"),
        );

        assert!(matches!(
            result,
            Err(ExecutionError::Consumer { phase: "handle", .. })
        ));
        assert_eq!(count, None);
        assert_eq!(events, vec!["init out.txt", "handle a=1"]);
    }
}
