//! Stdin-driven tag reader for hardware-free operation.
//!
//! Each line typed on standard input is treated as one tag presentation,
//! which makes the binary fully exercisable on a development machine with no
//! reader attached. Lines that do not form a valid tag identifier are logged
//! and skipped; end of input ends the read sequence.

use crate::{
    HardwareError, Result,
    traits::{TagRead, TagReader},
};
use gatehouse_core::TagId;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

/// Tag reader that consumes tag identifiers from standard input.
#[derive(Debug)]
pub struct StdinTagReader {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinTagReader {
    /// Create a reader over this process's standard input.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdinTagReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TagReader for StdinTagReader {
    async fn next_read(&mut self) -> Result<TagRead> {
        loop {
            let line = self
                .lines
                .next_line()
                .await?
                .ok_or_else(|| HardwareError::disconnected("stdin"))?;

            if line.trim().is_empty() {
                continue;
            }

            match TagId::new(&line) {
                Ok(tag) => return Ok(TagRead::now(tag)),
                Err(e) => {
                    warn!(input = %line.trim(), error = %e, "ignoring invalid tag input");
                }
            }
        }
    }
}
