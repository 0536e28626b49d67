// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, BufWriter, Stdout, Write};

use crate::builtins::for_each_line;
use crate::traits::{Consumer, Emitter, Generator};

/// Reads standard input line by line; the key is the line index.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinInput;

impl StdinInput {
    pub fn new() -> Self {
        Self
    }
}

fn emit_indexed_lines(reader: impl BufRead, emitter: &mut dyn Emitter) -> anyhow::Result<()> {
    for_each_line(reader, |index, line| emitter.emit(index.to_string(), line))?;
    Ok(())
}

impl Generator for StdinInput {
    fn generate(&mut self, _param: &str, emitter: &mut dyn Emitter) -> anyhow::Result<()> {
        emit_indexed_lines(io::stdin().lock(), emitter)
    }
}

/// Line format for `StdoutOutput`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// The value alone.
    #[default]
    Plain,
    /// `{"key":…,"value":…}`
    Json,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    key: &'a str,
    value: &'a str,
}

impl OutputFormat {
    fn render(self, key: &str, value: &str) -> anyhow::Result<String> {
        match self {
            OutputFormat::Plain => Ok(value.to_string()),
            OutputFormat::Json => Ok(serde_json::to_string(&JsonLine { key, value })?),
        }
    }
}

/// Prints one line per result to standard output.
#[derive(Debug)]
pub struct StdoutOutput {
    format: OutputFormat,
    out: Option<BufWriter<Stdout>>,
}

impl StdoutOutput {
    pub fn new(format: OutputFormat) -> Self {
        Self { format, out: None }
    }
}

impl Default for StdoutOutput {
    fn default() -> Self {
        Self::new(OutputFormat::Plain)
    }
}

impl Consumer for StdoutOutput {
    fn init(&mut self, _param: &str) -> anyhow::Result<()> {
        self.out = Some(BufWriter::new(io::stdout()));
        Ok(())
    }

    fn handle(&mut self, _param: &str, key: &str, value: &str) -> anyhow::Result<()> {
        let line = self.format.render(key, value)?;
        let out = self
            .out
            .as_mut()
            .ok_or_else(|| anyhow!("stdout output used before init"))?;
        writeln!(out, "{line}")?;
        Ok(())
    }

    fn complete(&mut self) -> anyhow::Result<()> {
        if let Some(mut out) = self.out.take() {
            out.flush()?;
        }
        Ok(())
    }
}
