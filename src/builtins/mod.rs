// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Stock generators and consumers.

mod file;
mod memory;
mod stdio;

pub use file::{FileInput, FileOutput};
pub use memory::{MemoryInput, MemoryOutput, SharedRecords};
pub use stdio::{OutputFormat, StdinInput, StdoutOutput};

use std::io::{self, BufRead};

/// Call `on_line` with the index and text of every line in `reader`.
///
/// Line endings (`\n` or `\r\n`) are stripped. Bytes that are not valid
/// UTF-8 are replaced with U+FFFD instead of failing the read.
pub(crate) fn for_each_line<R, F>(mut reader: R, mut on_line: F) -> io::Result<()>
where
    R: BufRead,
    F: FnMut(usize, String),
{
    let mut buf = Vec::new();
    let mut index = 0;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        on_line(index, String::from_utf8_lossy(&buf).into_owned());
        index += 1;
    }
}
