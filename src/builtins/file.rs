// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{anyhow, Context};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::builtins::for_each_line;
use crate::traits::{Consumer, Emitter, Generator};

/// Reads a file, or every regular file directly inside a directory.
///
/// Each line becomes one record keyed `"<file name>:<line index>"`, with the
/// line itself as the value. Directory entries are visited in name order.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileInput;

impl FileInput {
    pub fn new() -> Self {
        Self
    }
}

fn emit_lines(path: &Path, emitter: &mut dyn Emitter) -> anyhow::Result<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;

    for_each_line(BufReader::new(file), |index, line| {
        emitter.emit(format!("{name}:{index}"), line)
    })
    .with_context(|| format!("reading {}", path.display()))
}

impl Generator for FileInput {
    fn generate(&mut self, param: &str, emitter: &mut dyn Emitter) -> anyhow::Result<()> {
        let path = Path::new(param);
        let metadata = fs::metadata(path).with_context(|| format!("inspecting {param}"))?;

        if !metadata.is_dir() {
            return emit_lines(path, emitter);
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("listing {param}"))? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();

        for file in files {
            emit_lines(&file, emitter)?;
        }
        Ok(())
    }
}

/// Writes each value on its own line to the file named by the output param.
///
/// The file is created (truncated) in `init` and flushed in `complete`.
#[derive(Debug, Default)]
pub struct FileOutput {
    writer: Option<BufWriter<File>>,
}

impl FileOutput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Consumer for FileOutput {
    fn init(&mut self, param: &str) -> anyhow::Result<()> {
        let file = File::create(param).with_context(|| format!("creating {param}"))?;
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }

    fn handle(&mut self, _param: &str, _key: &str, value: &str) -> anyhow::Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| anyhow!("file output used before init"))?;
        writeln!(writer, "{value}")?;
        Ok(())
    }

    fn complete(&mut self) -> anyhow::Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}
