// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use crate::engine::distributors::DistributorSpec;
use crate::engine::queue::{broadcast_end, QueueSender};
use crate::engine::worker::{queue_closed, RoutingEmitter};
use crate::errors::ExecutionError;
use crate::observability::messages::stage::{GeneratorFailed, StageFinished, StageStarted};
use crate::observability::messages::StructuredLog;
use crate::traits::{Distributor, Generator, Stage};

pub(crate) const INPUT_LABEL: &str = "input";

/// Input side of a pipeline: a generator, the parameter it is called with,
/// and how its records are spread over the first layer (round-robin unless
/// overridden).
pub struct InputSpec {
    pub(crate) param: String,
    pub(crate) generator: Box<dyn Generator>,
    pub(crate) distributor: Option<DistributorSpec>,
}

impl InputSpec {
    pub fn new(param: impl Into<String>, generator: impl Generator + 'static) -> Self {
        Self {
            param: param.into(),
            generator: Box::new(generator),
            distributor: None,
        }
    }

    pub fn with_distributor(mut self, distributor: DistributorSpec) -> Self {
        self.distributor = Some(distributor);
        self
    }
}

impl fmt::Debug for InputSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputSpec")
            .field("param", &self.param)
            .field("distributor", &self.distributor)
            .finish()
    }
}

pub(crate) struct InputStage {
    param: String,
    generator: Box<dyn Generator>,
    distributor: Box<dyn Distributor>,
    endpoints: Vec<QueueSender>,
}

impl InputStage {
    pub(crate) fn new(spec: InputSpec, endpoints: Vec<QueueSender>) -> Self {
        let distributor = spec
            .distributor
            .unwrap_or(DistributorSpec::RoundRobin)
            .instantiate(endpoints.len());
        Self {
            param: spec.param,
            generator: spec.generator,
            distributor,
            endpoints,
        }
    }
}

impl Stage for InputStage {
    fn label(&self) -> &str {
        INPUT_LABEL
    }

    fn run(mut self: Box<Self>) -> Result<(), ExecutionError> {
        StageStarted {
            stage: INPUT_LABEL,
            upstream: 0,
            downstream: self.endpoints.len(),
            distributor: self.distributor.name(),
        }
        .log();

        let mut emitter = RoutingEmitter::new(self.distributor.as_mut(), &self.endpoints);
        // A failing generator truncates the stream; downstream still sees a clean end.
        if let Err(error) = self.generator.generate(&self.param, &mut emitter) {
            GeneratorFailed {
                param: &self.param,
                error: &error,
            }
            .log();
        }
        emitter.check_open(INPUT_LABEL)?;
        let emitted = emitter.emitted();

        broadcast_end(&self.endpoints).map_err(|_| queue_closed(INPUT_LABEL))?;

        StageFinished {
            stage: INPUT_LABEL,
            received: 0,
            emitted,
        }
        .log();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::queue::{bounded, QueueReceiver};
    use crate::engine::Record;
    use crate::traits::Emitter;

    fn drain(rx: &mut QueueReceiver) -> Vec<Record> {
        let mut records = Vec::new();
        while let Some(record) = rx.recv() {
            records.push(record);
        }
        records
    }

    #[test]
    fn test_input_round_robins_then_broadcasts_end() {
        let (a_tx, mut a_rx) = bounded(8);
        let (b_tx, mut b_rx) = bounded(8);

        let generator = |param: &str, emitter: &mut dyn Emitter| -> anyhow::Result<()> {
            for i in 0..3 {
                emitter.emit(format!("{param}:{i}"), i.to_string());
            }
            Ok(())
        };
        let stage = InputStage::new(InputSpec::new("src", generator), vec![a_tx, b_tx]);
        Box::new(stage).run().unwrap();

        assert_eq!(
            drain(&mut a_rx),
            vec![Record::data("src:0", "0"), Record::data("src:2", "2"), Record::EndOfStream]
        );
        assert_eq!(drain(&mut b_rx), vec![Record::data("src:1", "1"), Record::EndOfStream]);
    }

    #[test]
    fn test_failing_generator_still_ends_stream() {
        let (tx, mut rx) = bounded(8);

        let generator = |_: &str, emitter: &mut dyn Emitter| -> anyhow::Result<()> {
            emitter.emit("k".into(), "v".into());
            anyhow::bail!("disk on fire")
        };
        Box::new(InputStage::new(InputSpec::new("", generator), vec![tx]))
            .run()
            .unwrap();

        assert_eq!(drain(&mut rx), vec![Record::data("k", "v"), Record::EndOfStream]);
    }
}
