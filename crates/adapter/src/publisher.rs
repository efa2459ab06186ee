//! Channel hand-off from the synchronous engine to an async presentation task.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tower_cascade_core::ActionConsumer;
use tower_cascade_types::GridAction;

use crate::mirror::BlockMirror;

/// One applied batch with its position in the stream (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchMessage {
    pub seq: u64,
    pub actions: Vec<GridAction>,
}

/// Listener that forwards every batch over an unbounded channel.
///
/// Sending never blocks, so the engine stays synchronous. Once the receiver
/// is gone the publisher logs once and drops further batches.
#[derive(Debug)]
pub struct BatchPublisher {
    tx: mpsc::UnboundedSender<BatchMessage>,
    seq: u64,
    closed: bool,
}

impl BatchPublisher {
    pub fn new(tx: mpsc::UnboundedSender<BatchMessage>) -> Self {
        Self {
            tx,
            seq: 0,
            closed: false,
        }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<BatchMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Batches handed to the channel so far.
    pub fn sent(&self) -> u64 {
        self.seq
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl ActionConsumer for BatchPublisher {
    fn apply_actions(&mut self, batch: &[GridAction]) {
        if self.closed {
            return;
        }
        let msg = BatchMessage {
            seq: self.seq + 1,
            actions: batch.to_vec(),
        };
        if self.tx.send(msg).is_err() {
            self.closed = true;
            println!("[Adapter] presentation channel closed; dropping batches");
            return;
        }
        self.seq += 1;
    }
}

/// Presentation loop: apply every received batch to `mirror` until the
/// sending side is dropped, then hand the mirror back.
pub async fn run_presenter(
    mut rx: mpsc::UnboundedReceiver<BatchMessage>,
    mut mirror: BlockMirror,
) -> BlockMirror {
    while let Some(msg) = rx.recv().await {
        mirror.apply_actions(&msg.actions);
    }
    mirror
}
