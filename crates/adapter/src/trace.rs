//! JSON-lines action trace.
//!
//! Each applied batch becomes one line, `{"seq":N,"actions":[...]}`. A trace
//! plus the starting layout is enough to replay a level without the
//! detector.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tower_cascade_core::{ActionConsumer, Grid};
use tower_cascade_types::GridAction;

use crate::publisher::BatchMessage;

/// Listener that writes every batch as one JSON line.
///
/// Write errors do not interrupt the session: the first one is kept and
/// returned by [`TraceRecorder::finish`], later batches are skipped.
pub struct TraceRecorder<W: Write> {
    writer: W,
    seq: u64,
    error: Option<anyhow::Error>,
}

impl<W: Write> TraceRecorder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            seq: 0,
            error: None,
        }
    }

    pub fn lines_written(&self) -> u64 {
        self.seq
    }

    fn write_batch(&mut self, batch: &[GridAction]) -> Result<()> {
        let msg = BatchMessage {
            seq: self.seq + 1,
            actions: batch.to_vec(),
        };
        serde_json::to_writer(&mut self.writer, &msg).context("serialize batch")?;
        self.writer.write_all(b"\n").context("write trace line")?;
        self.seq += 1;
        Ok(())
    }

    /// Flush and return the writer, or the first error seen.
    pub fn finish(mut self) -> Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer.flush().context("flush trace")?;
        Ok(self.writer)
    }
}

impl<W: Write> ActionConsumer for TraceRecorder<W> {
    fn apply_actions(&mut self, batch: &[GridAction]) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.write_batch(batch) {
            eprintln!("[Trace] {:#}", err);
            self.error = Some(err);
        }
    }
}

/// Parse a trace written by [`TraceRecorder`]. Blank lines are skipped.
pub fn read_trace(reader: impl BufRead) -> Result<Vec<BatchMessage>> {
    let mut out = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read trace line {}", i + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let msg: BatchMessage =
            serde_json::from_str(&line).with_context(|| format!("parse trace line {}", i + 1))?;
        out.push(msg);
    }
    Ok(out)
}

/// Re-apply recorded batches to `grid`, in order.
pub fn replay(grid: &mut Grid, trace: &[BatchMessage]) {
    for msg in trace {
        grid.apply_actions(&msg.actions);
    }
}
